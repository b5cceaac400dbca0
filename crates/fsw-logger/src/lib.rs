//! The Data Vector Logger: periodically snapshots a node's Data Vector and
//! writes it to disk, either as an appended CSV history or an overwritten
//! human-readable WATCH file (`SPEC_FULL.md` §0, §2).

mod logger;
mod mode;
mod names;

pub use logger::DataVectorLogger;
pub use mode::LogMode;
pub use names::LogNames;

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use fsw_datavector::{DataVector, DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};

    use super::*;

    fn test_config() -> DvConfig {
        DvConfig::new(vec![
            RegionConfig::new(RegionId(0), vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))]),
            RegionConfig::new(
                RegionId(1),
                vec![
                    ElementConfig::new(ElementId(1), TypedValue::U16(0)),
                    ElementConfig::new(ElementId(2), TypedValue::Bool(false)),
                ],
            ),
        ])
    }

    fn test_names() -> LogNames {
        LogNames::new()
            .with_region(RegionId(0), "DV_REG_TEST0")
            .with_region(RegionId(1), "DV_REG_TEST1")
            .with_element(ElementId(0), "DV_ELEM_TEST0")
            .with_element(ElementId(1), "DV_ELEM_TEST1")
            .with_element(ElementId(2), "DV_ELEM_TEST2")
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fsw-logger-test-{tag}-{:?}.log", std::thread::current().id()))
    }

    #[test]
    fn csv_mode_writes_header_then_rows() {
        let path = temp_path("csv");
        let dv = Arc::new(DataVector::create(test_config()).unwrap());
        let mut logger = DataVectorLogger::create(LogMode::Csv, dv.clone(), &path, test_names()).unwrap();

        let header = fs::read_to_string(&path).unwrap();
        assert_eq!(header, "DV_REG_TEST0,DV_ELEM_TEST0,DV_REG_TEST1,DV_ELEM_TEST1,DV_ELEM_TEST2,\n");

        logger.log().unwrap();
        let after_row = fs::read_to_string(&path).unwrap();
        assert_eq!(after_row, format!("{header},0,,0,0,\n"));

        dv.write::<u8>(ElementId(0), 255).unwrap();
        dv.write::<bool>(ElementId(2), true).unwrap();
        logger.log().unwrap();
        let after_second_row = fs::read_to_string(&path).unwrap();
        assert_eq!(after_second_row, format!("{after_row},255,,0,1,\n"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn watch_mode_overwrites_in_place() {
        let path = temp_path("watch");
        let dv = Arc::new(DataVector::create(test_config()).unwrap());
        let mut logger = DataVectorLogger::create(LogMode::Watch, dv.clone(), &path, test_names()).unwrap();

        logger.log().unwrap();
        let first = fs::read_to_string(&path).unwrap();
        assert!(first.contains("Region: DV_REG_TEST0"));
        assert!(first.contains("DV_ELEM_TEST0:                   0\n"));
        assert!(first.ends_with("DV_ELEM_TEST2:                   0\n\n"));

        dv.write::<u8>(ElementId(0), 7).unwrap();
        logger.log().unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert!(second.contains("DV_ELEM_TEST0:                   7\n"));
        // Overwritten in place, not appended: file length stays stable
        // across calls that don't change value widths.
        assert_eq!(first.len(), second.len());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn unnamed_ids_fall_back_to_numeric_display() {
        let path = temp_path("fallback");
        let dv = Arc::new(DataVector::create(test_config()).unwrap());
        let mut logger = DataVectorLogger::create(LogMode::Csv, dv, &path, LogNames::new()).unwrap();
        logger.log().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("0,0,1,1,2,\n"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_unopenable_path() {
        let dv = Arc::new(DataVector::create(test_config()).unwrap());
        let err =
            DataVectorLogger::create(LogMode::Watch, dv, "/nonexistent-dir/file.log", LogNames::new()).unwrap_err();
        assert_eq!(err, fsw_errors::Error::FailedToOpenFile);
    }
}
