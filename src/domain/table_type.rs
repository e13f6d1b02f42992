/// Seating class of a table, which fixes how many chairs it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    TwoPair,
    FourPair,
    EightPair,
}

impl TableType {
    pub fn chair_count(&self) -> i32 {
        match self {
            TableType::TwoPair => 2,
            TableType::FourPair => 4,
            TableType::EightPair => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::TwoPair => "2-pair",
            TableType::FourPair => "4-pair",
            TableType::EightPair => "8-pair",
        }
    }
}

impl TryFrom<String> for TableType {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "2-pair" | "2" => Ok(Self::TwoPair),
            "4-pair" | "4" => Ok(Self::FourPair),
            "8-pair" | "8" => Ok(Self::EightPair),
            other => Err(format!(
                "{} is not a supported table type. \
                    Use '2-pair', '4-pair' or '8-pair'.",
                other
            )),
        }
    }
}

/// Chair numbers and names for a new table, continuing after the highest
/// chair number in use across all tables.
pub fn chair_sequence(
    last_chair_number: i32,
    chair_count: i32,
) -> impl Iterator<Item = (i32, String)> {
    (last_chair_number + 1..=last_chair_number + chair_count)
        .map(|number| (number, format!("C{}", number)))
}
