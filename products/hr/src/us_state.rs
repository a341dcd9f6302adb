use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::model::ParseValueError;

macro_rules! us_states {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// The fixed set of US states an employee can be assigned to.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum UsState {
            $($variant),+
        }

        impl UsState {
            pub const ALL: &'static [UsState] = &[$(UsState::$variant),+];

            /// Full state name, also the wire representation.
            pub fn name(self) -> &'static str {
                match self {
                    $(UsState::$variant => $name),+
                }
            }
        }
    };
}

us_states! {
    Alabama => "Alabama",
    Alaska => "Alaska",
    Arizona => "Arizona",
    Arkansas => "Arkansas",
    California => "California",
    Colorado => "Colorado",
    Connecticut => "Connecticut",
    Delaware => "Delaware",
    Florida => "Florida",
    Georgia => "Georgia",
    Hawaii => "Hawaii",
    Idaho => "Idaho",
    Illinois => "Illinois",
    Indiana => "Indiana",
    Iowa => "Iowa",
    Kansas => "Kansas",
    Kentucky => "Kentucky",
    Louisiana => "Louisiana",
    Maine => "Maine",
    Maryland => "Maryland",
    Massachusetts => "Massachusetts",
    Michigan => "Michigan",
    Minnesota => "Minnesota",
    Mississippi => "Mississippi",
    Missouri => "Missouri",
    Montana => "Montana",
    Nebraska => "Nebraska",
    Nevada => "Nevada",
    NewHampshire => "New Hampshire",
    NewJersey => "New Jersey",
    NewMexico => "New Mexico",
    NewYork => "New York",
    NorthCarolina => "North Carolina",
    NorthDakota => "North Dakota",
    Ohio => "Ohio",
    Oklahoma => "Oklahoma",
    Oregon => "Oregon",
    Pennsylvania => "Pennsylvania",
    RhodeIsland => "Rhode Island",
    SouthCarolina => "South Carolina",
    SouthDakota => "South Dakota",
    Tennessee => "Tennessee",
    Texas => "Texas",
    Utah => "Utah",
    Vermont => "Vermont",
    Virginia => "Virginia",
    Washington => "Washington",
    WestVirginia => "West Virginia",
    Wisconsin => "Wisconsin",
    Wyoming => "Wyoming",
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UsState {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        UsState::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseValueError::new("state", value))
    }
}

impl Serialize for UsState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for UsState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
