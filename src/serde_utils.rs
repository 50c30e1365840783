// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Some utilities for serialize / deserialize transit model objects.

use crate::objects::Date;
use chrono::NaiveDate;

/// deserialize u8 as bool
/// returns an error if non boolean value
pub fn de_from_u8<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::{
        de::{Error, Unexpected::Other},
        Deserialize,
    };
    let i = <u8 as Deserialize<'de>>::deserialize(deserializer)?;
    if i == 0 || i == 1 {
        Ok(i != 0)
    } else {
        Err(D::Error::invalid_value(
            Other(&format!("{} non boolean value", i)),
            &"boolean",
        ))
    }
}

/// deserialize date from String in the `%Y%m%d` form
pub fn de_from_date_string<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let s = String::deserialize(deserializer)?;

    NaiveDate::parse_from_str(&s, "%Y%m%d").map_err(serde::de::Error::custom)
}

/// deserialize optional date from String in the `%Y%m%d` form
/// returns None on an absent or empty field
pub fn de_option_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let option = Option::<String>::deserialize(deserializer)?;
    match option {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y%m%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// serialize optional date to String in the `%Y%m%d` form
// The signature of the function must pass by reference for 'serde' to be able to use the function
pub fn ser_option_date<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format!("{}", date.format("%Y%m%d"))),
        None => serializer.serialize_none(),
    }
}

/// deserialize optional 0/1 flag as bool
pub fn de_option_bool_from_u8<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let option = Option::<u8>::deserialize(deserializer)?;
    Ok(option.map(|i| i != 0))
}

/// deserialize type T or returns its default value
pub fn de_with_empty_default<'de, T: Default, D>(de: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Option::<T>::deserialize(de).map(|opt| opt.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    mod serde_option_date {
        use super::*;
        use pretty_assertions::assert_eq;
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        struct WithDate {
            #[serde(
                default,
                deserialize_with = "de_option_date",
                serialize_with = "ser_option_date"
            )]
            date: Option<Date>,
        }

        #[test]
        fn with_date() {
            let json = r#"{"date": "20240106"}"#;
            let object: WithDate = serde_json::from_str(json).unwrap();
            assert_eq!(Some(Date::from_ymd_opt(2024, 1, 6).unwrap()), object.date);
        }

        #[test]
        fn with_empty_string() {
            let json = r#"{"date": ""}"#;
            let object: WithDate = serde_json::from_str(json).unwrap();
            assert_eq!(None, object.date);
        }

        #[test]
        fn without_field() {
            let json = r#"{}"#;
            let object: WithDate = serde_json::from_str(json).unwrap();
            assert_eq!(None, object.date);
        }

        #[test]
        fn round_trip() {
            let object = WithDate {
                date: Some(Date::from_ymd_opt(2024, 1, 6).unwrap()),
            };
            let json = serde_json::to_string(&object).unwrap();
            assert_eq!(r#"{"date":"20240106"}"#, json);
        }
    }
}
