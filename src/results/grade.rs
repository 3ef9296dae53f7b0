use serde::Serialize;

/// Converts a letter grade into grade points.
///
/// | Letter | Points |
/// |--------|--------|
/// | A      | 5      |
/// | B      | 4      |
/// | C      | 3      |
/// | D      | 2      |
/// | E      | 1      |
/// | F      | 0      |
///
/// Any other letter (including an empty one) is worth 0.
pub fn grade_point(letter: &str) -> u32 {
    match letter {
        "A" => 5,
        "B" => 4,
        "C" => 3,
        "D" => 2,
        "E" => 1,
        _ => 0,
    }
}

/// Highest grade point any letter can earn.
pub const MAX_GRADE_POINT: f64 = 5.0;

/// Degree classification derived from a CGPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeClass {
    FirstClass,
    SecondClassUpper,
    SecondClassLower,
    ThirdClass,
    Pass,
}

impl GradeClass {
    /// Classifies a CGPA on the 0.00–5.00 scale.
    ///
    /// | Range   | Class              |
    /// |---------|--------------------|
    /// | >= 4.50 | First Class        |
    /// | >= 3.50 | Second Class Upper |
    /// | >= 2.50 | Second Class Lower |
    /// | >= 1.50 | Third Class        |
    /// | < 1.50  | Pass               |
    ///
    /// NaN falls through to `Pass`.
    pub fn from_cgpa(cgpa: f64) -> Self {
        match cgpa {
            c if c >= 4.5 => GradeClass::FirstClass,
            c if c >= 3.5 => GradeClass::SecondClassUpper,
            c if c >= 2.5 => GradeClass::SecondClassLower,
            c if c >= 1.5 => GradeClass::ThirdClass,
            _ => GradeClass::Pass,
        }
    }

    /// Classifies a CGPA given as text; anything unparsable is a `Pass`.
    pub fn from_cgpa_str(cgpa: &str) -> Self {
        cgpa.trim()
            .parse::<f64>()
            .map(Self::from_cgpa)
            .unwrap_or(GradeClass::Pass)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GradeClass::FirstClass => "First Class",
            GradeClass::SecondClassUpper => "Second Class Upper",
            GradeClass::SecondClassLower => "Second Class Lower",
            GradeClass::ThirdClass => "Third Class",
            GradeClass::Pass => "Pass",
        }
    }

    /// Gradient token the dashboard uses to tint the class badge.
    pub fn accent(&self) -> &'static str {
        match self {
            GradeClass::FirstClass => "from-green-400 to-emerald-500",
            GradeClass::SecondClassUpper => "from-blue-400 to-cyan-500",
            GradeClass::SecondClassLower => "from-purple-400 to-indigo-500",
            GradeClass::ThirdClass => "from-orange-400 to-amber-500",
            GradeClass::Pass => "from-red-400 to-pink-500",
        }
    }
}

impl std::fmt::Display for GradeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for GradeClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("GradeClass", 2)?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("accent", self.accent())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_point_table() {
        assert_eq!(grade_point("A"), 5);
        assert_eq!(grade_point("B"), 4);
        assert_eq!(grade_point("C"), 3);
        assert_eq!(grade_point("D"), 2);
        assert_eq!(grade_point("E"), 1);
        assert_eq!(grade_point("F"), 0);
    }

    #[test]
    fn test_unknown_letters_are_worth_nothing() {
        assert_eq!(grade_point(""), 0);
        assert_eq!(grade_point("A+"), 0);
        assert_eq!(grade_point("a"), 0);
        assert_eq!(grade_point("Z"), 0);
    }

    #[test]
    fn test_class_boundaries() {
        assert_eq!(GradeClass::from_cgpa(5.00), GradeClass::FirstClass);
        assert_eq!(GradeClass::from_cgpa(4.50), GradeClass::FirstClass);
        assert_eq!(GradeClass::from_cgpa(4.49), GradeClass::SecondClassUpper);
        assert_eq!(GradeClass::from_cgpa(3.50), GradeClass::SecondClassUpper);
        assert_eq!(GradeClass::from_cgpa(3.49), GradeClass::SecondClassLower);
        assert_eq!(GradeClass::from_cgpa(2.50), GradeClass::SecondClassLower);
        assert_eq!(GradeClass::from_cgpa(2.49), GradeClass::ThirdClass);
        assert_eq!(GradeClass::from_cgpa(1.50), GradeClass::ThirdClass);
        assert_eq!(GradeClass::from_cgpa(1.49), GradeClass::Pass);
        assert_eq!(GradeClass::from_cgpa(0.00), GradeClass::Pass);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(GradeClass::from_cgpa(4.50).name(), "First Class");
        assert_eq!(GradeClass::from_cgpa(3.50).name(), "Second Class Upper");
        assert_eq!(GradeClass::from_cgpa(2.50).name(), "Second Class Lower");
        assert_eq!(GradeClass::from_cgpa(1.50).name(), "Third Class");
        assert_eq!(GradeClass::from_cgpa(0.00).to_string(), "Pass");
    }

    #[test]
    fn test_unparsable_input_is_pass() {
        assert_eq!(GradeClass::from_cgpa_str("4.60"), GradeClass::FirstClass);
        assert_eq!(GradeClass::from_cgpa_str(" 3.5 "), GradeClass::SecondClassUpper);
        assert_eq!(GradeClass::from_cgpa_str("n/a"), GradeClass::Pass);
        assert_eq!(GradeClass::from_cgpa_str(""), GradeClass::Pass);
        assert_eq!(GradeClass::from_cgpa(f64::NAN), GradeClass::Pass);
    }

    #[test]
    fn test_serializes_name_and_accent() {
        let json = serde_json::to_value(GradeClass::FirstClass).unwrap();
        assert_eq!(json["name"], "First Class");
        assert_eq!(json["accent"], "from-green-400 to-emerald-500");
    }
}
