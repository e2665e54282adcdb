//! Dissimilarity functions shared by the centroid models
//!
//! Numeric parts use squared Euclidean distance, categorical parts use
//! simple matching (count of unequal positions). Lower is closer.

/// Squared Euclidean distance between two equally sized vectors
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Number of positions where the two category vectors differ
#[inline]
pub fn matching_dissimilarity<A, B>(a: &[A], b: &[B]) -> usize
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    a.iter()
        .zip(b)
        .filter(|(x, y)| x.as_ref() != y.as_ref())
        .count()
}

/// Index of the smallest cost, first one on ties
pub fn argmin<I>(costs: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, cost) in costs.into_iter().enumerate() {
        match best {
            Some((_, b)) if cost >= b => {}
            _ => best = Some((i, cost)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_euclidean(&[1.5], &[1.5]), 0.0);
    }

    #[test]
    fn test_matching_dissimilarity() {
        let a = ["1", "2", "x"];
        let b = vec!["1".to_string(), "3".to_string(), "y".to_string()];
        assert_eq!(matching_dissimilarity(&a, &b), 2);
        assert_eq!(matching_dissimilarity(&a, &a), 0);
    }

    #[test]
    fn test_argmin_first_on_ties() {
        assert_eq!(argmin(vec![2.0, 1.0, 1.0]), Some(1));
        assert_eq!(argmin(Vec::<f64>::new()), None);
    }
}
