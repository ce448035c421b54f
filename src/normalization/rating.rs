/// Studio ratings arrive as `rating100`; the destination stores 0-5.
/// Values outside 0-100 are dropped.
pub fn studio_rating(rating100: Option<i64>) -> Option<f64> {
    let raw = rating100?;
    (0..=100).contains(&raw).then(|| raw as f64 / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_hundred_scale_linearly() {
        assert_eq!(studio_rating(Some(86)), Some(4.3));
        assert_eq!(studio_rating(Some(100)), Some(5.0));
        assert_eq!(studio_rating(Some(0)), Some(0.0));
    }

    #[test]
    fn absent_rating_stays_absent() {
        assert_eq!(studio_rating(None), None);
    }

    #[test]
    fn rejects_out_of_bounds_values() {
        assert!(studio_rating(Some(140)).is_none());
        assert!(studio_rating(Some(-5)).is_none());
    }
}
