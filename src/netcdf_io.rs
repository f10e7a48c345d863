//! Writes a precipitation dataset as a CF-1.7 NetCDF file.

use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use tracing::debug;

use crate::dataset::Dataset;

/// Creates `path` (replacing any existing file) with `time`, `lat`, `lon` and the data variable.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(e).with_context(|| format!("failed to replace {}", path.display()))
        }
        _ => {}
    }

    let (nt, nlat, nlon) = dataset.shape();
    let meta = &dataset.metadata;

    let mut file = netcdf::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    file.add_dimension("time", nt)?;
    file.add_dimension("lat", nlat)?;
    file.add_dimension("lon", nlon)?;

    file.add_attribute("Conventions", meta.conventions.as_str())?;
    file.add_attribute("source", meta.source.as_str())?;

    {
        let mut var = file.add_variable::<i64>("time", &["time"])?;
        var.put_attribute("units", dataset.time_units())?;
        var.put_values(&dataset.time, ..)?;
    }

    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_attribute("long_name", "latitude")?;
        var.put_values(&dataset.lat, ..)?;
    }

    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_attribute("long_name", "longitude")?;
        var.put_values(&dataset.lon, ..)?;
    }

    {
        let mut var = file.add_variable::<f32>(&dataset.name, &["time", "lat", "lon"])?;
        var.put_attribute("long_name", meta.long_name.as_str())?;
        var.put_attribute("units", meta.units.as_str())?;
        var.put_attribute("missing_value", meta.missing_value)?;
        if !dataset.values.is_empty() {
            var.put_values(&dataset.values, ..)?;
        }
    }

    debug!(path = %path.display(), time = nt, lat = nlat, lon = nlon, "dataset written");

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use netcdf::AttributeValue;
    use tempfile::TempDir;

    use super::*;
    use crate::grid::GridArray;

    fn string_attribute(value: AttributeValue) -> String {
        match value {
            AttributeValue::Str(s) => s,
            other => panic!("expected a string attribute, got {:?}", other),
        }
    }

    #[test]
    fn should_write_cf_dataset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gsmap_2024-10-21_00.nc");
        let grids: Vec<GridArray> = (0..2)
            .map(|t| GridArray {
                name: "precip".to_string(),
                lat: vec![5.0, 6.0],
                lon: vec![120.0, 121.0, 122.0],
                values: (0..6).map(|v| (t * 10 + v) as f32).collect(),
            })
            .collect();
        let epoch = Utc.with_ymd_and_hms(2024, 10, 21, 0, 0, 0).unwrap();
        let dataset = Dataset::concat(grids, epoch).unwrap();

        write_dataset(&dataset, &path).unwrap();

        let file = netcdf::open(&path).unwrap();
        assert_eq!(file.dimension("time").unwrap().len(), 2);
        assert_eq!(file.dimension("lat").unwrap().len(), 2);
        assert_eq!(file.dimension("lon").unwrap().len(), 3);
        assert_eq!(
            string_attribute(file.attribute("Conventions").unwrap().value().unwrap()),
            "CF-1.7"
        );

        let time = file.variable("time").unwrap();
        assert_eq!(
            string_attribute(time.attribute("units").unwrap().value().unwrap()),
            "hours since 2024-10-21 00:00:00"
        );
        assert_eq!(time.get_values::<i64, _>(..).unwrap(), vec![0, 1]);

        let lon = file.variable("lon").unwrap();
        assert_eq!(
            string_attribute(lon.attribute("standard_name").unwrap().value().unwrap()),
            "longitude"
        );

        let precip = file.variable("precip").unwrap();
        assert!(matches!(
            precip.attribute("missing_value").unwrap().value().unwrap(),
            AttributeValue::Float(v) if v == -99.0
        ));
        assert_eq!(
            precip.get_values::<f32, _>(..).unwrap(),
            dataset.values
        );
    }
}
