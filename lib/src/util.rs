use crate::{clean::parse_date_str, Result};
use chrono::NaiveDate;
use qu::ick_use::*;
use serde::{de, Deserialize, Deserializer};
use std::{fs, io, path::Path};

/// Converts a not found error to Ok(false)
pub fn path_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn check_extension(path: &Path, ext: &str) -> Result {
    ensure!(
        matches!(path.extension(), Some(p) if p.eq_ignore_ascii_case(ext)),
        "filename should end with `.{}`",
        ext
    );
    Ok(())
}

// Helpers for serde to parse fields with quirks.

/// Parse a string, but map "null" and blank strings to `None`.
pub fn optional_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(d)?;
    let s = s.as_deref().unwrap_or("").trim();
    if s.eq_ignore_ascii_case("null") || s.is_empty() {
        Ok(None)
    } else {
        Ok(Some(s.to_owned()))
    }
}

/// Parse a date in any format the report cleaners accept, mapping null and blank strings to `None`.
pub fn optional_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = match Option::<String>::deserialize(d)? {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(None),
    };
    parse_date_str(&s)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("unrecognised date \"{}\"", s)))
}

// error printing helper.
//
pub trait ResultExt {
    fn print_error(self) -> Self;
}

impl<T> ResultExt for Result<T, anyhow::Error> {
    fn print_error(self) -> Self {
        match self {
            Ok(v) => Ok(v),
            Err(error) => {
                println!("error: {}", error);
                let mut err: &dyn std::error::Error = error.as_ref();
                while let Some(cause) = err.source() {
                    println!("caused by: {}", cause);
                    err = cause;
                }
                Err(error)
            }
        }
    }
}

/// Print an underlined heading.
pub fn header(header: &str) {
    let len = header.chars().count();
    print!("\n{}\n", header);
    for _ in 0..len {
        print!("=");
    }
    println!("\n")
}

#[cfg(test)]
mod test {
    use super::{check_extension, optional_date};
    use serde::Deserialize;
    use std::path::Path;

    #[derive(Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "optional_date")]
        date: Option<chrono::NaiveDate>,
    }

    #[test]
    fn dates_in_config() {
        let dated: Dated = serde_json::from_str(r#"{"date": "15/03/2023"}"#).unwrap();
        assert_eq!(dated.date, chrono::NaiveDate::from_ymd_opt(2023, 3, 15));
        let blank: Dated = serde_json::from_str(r#"{"date": " "}"#).unwrap();
        assert_eq!(blank.date, None);
        let null: Dated = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(null.date, None);
        assert!(serde_json::from_str::<Dated>(r#"{"date": "soon"}"#).is_err());
    }

    #[test]
    fn extensions() {
        assert!(check_extension(Path::new("out/a.CSV"), "csv").is_ok());
        assert!(check_extension(Path::new("out/a.txt"), "csv").is_err());
    }
}
