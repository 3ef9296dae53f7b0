/// Credit-weighted grade point average to two decimal places, halves rounded
/// away from zero. Returns 0.0 when there are no credits.
///
/// Rounding happens on the exact quotient in integer arithmetic, so decimal
/// halves such as 1.025 are never misrounded by their binary approximation.
pub fn weighted_gpa(total_grade_points: u32, total_credits: u32) -> f64 {
    if total_credits == 0 {
        return 0.0;
    }
    let points = u64::from(total_grade_points);
    let credits = u64::from(total_credits);
    let hundredths = (points * 200 + credits) / (2 * credits);
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_credits() {
        assert_eq!(weighted_gpa(0, 0), 0.0);
        assert_eq!(weighted_gpa(12, 0), 0.0);
    }

    #[test]
    fn test_weighted_gpa() {
        assert_eq!(weighted_gpa(23, 5), 4.6);
        assert_eq!(weighted_gpa(10, 3), 3.33);
        assert_eq!(weighted_gpa(20, 3), 6.67);
        assert_eq!(weighted_gpa(69, 19), 3.63);
    }

    #[test]
    fn test_decimal_halves_round_up() {
        // 1.025, 2.425 and 1.005 sit just below the half in binary.
        assert_eq!(weighted_gpa(41, 40), 1.03);
        assert_eq!(weighted_gpa(97, 40), 2.43);
        assert_eq!(weighted_gpa(201, 200), 1.01);
        assert_eq!(weighted_gpa(899, 200), 4.5);
        assert_eq!(weighted_gpa(699, 200), 3.5);
    }
}
