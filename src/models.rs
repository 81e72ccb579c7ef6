use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::Postgres;
use uuid::Uuid;

/// Attendance status for one subject on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PRESENT")]
    Present,
    #[serde(rename = "ABSENT")]
    Absent,
    #[serde(rename = "NO_CLASS")]
    NoClass,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Present => "PRESENT",
            Status::Absent => "ABSENT",
            Status::NoClass => "NO_CLASS",
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PRESENT" => Ok(Status::Present),
            "ABSENT" => Ok(Status::Absent),
            "NO_CLASS" => Ok(Status::NoClass),
            other => Err(format!("`{}` is not a valid status choice", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MON")]
    Mon,
    #[serde(rename = "TUE")]
    Tue,
    #[serde(rename = "WED")]
    Wed,
    #[serde(rename = "THU")]
    Thu,
    #[serde(rename = "FRI")]
    Fri,
    #[serde(rename = "SAT")]
    Sat,
    #[serde(rename = "SUN")]
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Calendar position, MON = 0 .. SUN = 6. Schedules sort by this.
    pub fn ordinal(&self) -> u8 {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
            Weekday::Sat => 5,
            Weekday::Sun => 6,
        }
    }
}

impl TryFrom<&str> for Weekday {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "MON" => Ok(Weekday::Mon),
            "TUE" => Ok(Weekday::Tue),
            "WED" => Ok(Weekday::Wed),
            "THU" => Ok(Weekday::Thu),
            "FRI" => Ok(Weekday::Fri),
            "SAT" => Ok(Weekday::Sat),
            "SUN" => Ok(Weekday::Sun),
            other => Err(format!("`{}` is not a valid weekday choice", other)),
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

// Both enums live in TEXT columns holding their wire codes, so they encode and
// decode through `&str` rather than a custom Postgres type.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <&str as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <&str as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, Postgres> for $ty {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let text = <&str as sqlx::Decode<Postgres>>::decode(value)?;
                <$ty>::try_from(text).map_err(Into::into)
            }
        }

        impl<'q> sqlx::Encode<'q, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as sqlx::Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_column!(Status);
text_column!(Weekday);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserData {
    #[serde(rename = "id")]
    pub uuid: Uuid,
    pub username: String,
    pub id_card_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionData {
    pub token: String,
    pub refresh_token: String,
    pub belongs_to: Uuid,
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubjectData {
    #[serde(rename = "id")]
    pub uuid: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceData {
    #[serde(rename = "id")]
    pub uuid: Uuid,
    pub subject: Uuid,
    pub date: NaiveDate,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimetableData {
    pub uuid: Uuid,
    pub subject: Uuid,
    pub day_of_week: Weekday,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Hand-rolled so the payload can carry `day_label` ("Monday") next to the
// stored weekday code.
impl Serialize for TimetableData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut row = serializer.serialize_struct("TimetableData", 8)?;
        row.serialize_field("id", &self.uuid)?;
        row.serialize_field("subject", &self.subject)?;
        row.serialize_field("day_of_week", &self.day_of_week)?;
        row.serialize_field("day_label", self.day_of_week.label())?;
        row.serialize_field("start_time", &self.start_time)?;
        row.serialize_field("end_time", &self.end_time)?;
        row.serialize_field("created_at", &self.created_at)?;
        row.serialize_field("updated_at", &self.updated_at)?;
        row.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [Status::Present, Status::Absent, Status::NoClass] {
            assert_eq!(Status::try_from(status.as_str()), Ok(status));
        }
        assert!(Status::try_from("LATE").is_err());
    }

    #[test]
    fn weekday_codes_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::try_from(day.as_str()), Ok(day));
        }
        assert!(Weekday::try_from("mon").is_err());
        assert!(Weekday::try_from("FUN").is_err());
    }

    #[test]
    fn weekdays_sort_in_calendar_order() {
        let mut days = vec![Weekday::Sun, Weekday::Wed, Weekday::Mon];
        days.sort_by_key(|d| d.ordinal());
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);
    }

    #[test]
    fn chrono_weekdays_map_onto_codes() {
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Mon);
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sun);
    }

    #[test]
    fn status_serializes_as_wire_code() {
        assert_eq!(
            serde_json::to_value(Status::NoClass).unwrap(),
            serde_json::json!("NO_CLASS")
        );
    }

    #[test]
    fn timetable_rows_carry_a_day_label() {
        let row = TimetableData {
            uuid: Uuid::new_v4(),
            subject: Uuid::new_v4(),
            day_of_week: Weekday::Wed,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["day_of_week"], "WED");
        assert_eq!(json["day_label"], "Wednesday");
        assert_eq!(json["start_time"], serde_json::Value::Null);
    }
}
