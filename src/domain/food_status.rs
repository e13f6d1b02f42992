#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodStatus {
    NotOrdered,
    WithFood,
    WithoutFood,
}

impl FoodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodStatus::NotOrdered => "not_ordered",
            FoodStatus::WithFood => "with_food",
            FoodStatus::WithoutFood => "without_food",
        }
    }
}

impl TryFrom<String> for FoodStatus {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "not_ordered" => Ok(Self::NotOrdered),
            "with_food" => Ok(Self::WithFood),
            "without_food" => Ok(Self::WithoutFood),
            other => Err(format!(
                "{} is not a supported food status. \
                    Use 'not_ordered', 'with_food' or 'without_food'.",
                other
            )),
        }
    }
}

impl std::fmt::Display for FoodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
