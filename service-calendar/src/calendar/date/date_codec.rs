pub mod gtfs {
    //! serde helpers for dates written to and read from GTFS-style tables,
    //! which use the yyyymmdd format.
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const GTFS_DATE_FORMAT: &str = "%Y%m%d";

    pub fn serialize_naive_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(GTFS_DATE_FORMAT).to_string())
    }

    pub fn deserialize_naive_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str: String = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&date_str, GTFS_DATE_FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid GTFS date '{date_str}': {e}")))
    }
}
