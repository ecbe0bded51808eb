//! Running totals over numeric sequences

use crate::error::InputError;
use std::ops::Add;

/// Iterator yielding the running total of the wrapped iterator.
#[derive(Debug, Clone)]
pub struct CumulativeSum<I: Iterator> {
    iter: I,
    total: Option<I::Item>,
}

impl<I> Iterator for CumulativeSum<I>
where
    I: Iterator,
    I::Item: Add<Output = I::Item> + Copy,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.iter.next()?;
        let total = match self.total {
            Some(total) => total + next,
            None => next,
        };
        self.total = Some(total);
        Some(total)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Lazily yield the cumulative sum of `numbers`.
///
/// ```
/// use nxmisc::core::sequence::cumulative_sum;
///
/// let totals: Vec<i32> = cumulative_sum([1, 2, 3, 4]).collect();
/// assert_eq!(totals, vec![1, 3, 6, 10]);
/// ```
pub fn cumulative_sum<I>(numbers: I) -> CumulativeSum<I::IntoIter>
where
    I: IntoIterator,
{
    CumulativeSum {
        iter: numbers.into_iter(),
        total: None,
    }
}

pub trait CumulativeSumExt: Iterator + Sized {
    fn cumulative_sum(self) -> CumulativeSum<Self> {
        cumulative_sum(self)
    }
}

impl<I: Iterator> CumulativeSumExt for I {}

/// Integer running totals that stop at the first overflow.
pub fn checked_cumulative_sum(numbers: &[i64]) -> Result<Vec<i64>, InputError> {
    let mut totals = Vec::with_capacity(numbers.len());
    let mut total: i64 = 0;
    for (index, number) in numbers.iter().enumerate() {
        total = total
            .checked_add(*number)
            .ok_or(InputError::Overflow { index })?;
        totals.push(total);
    }
    Ok(totals)
}

/// Float running totals that stop once the total is no longer finite.
pub fn checked_float_cumulative_sum(numbers: &[f64]) -> Result<Vec<f64>, InputError> {
    numbers
        .iter()
        .copied()
        .cumulative_sum()
        .enumerate()
        .map(|(index, total)| {
            if total.is_finite() {
                Ok(total)
            } else {
                Err(InputError::Overflow { index })
            }
        })
        .collect()
}

/// A parsed list of numbers: integers when every input is one, floats otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Numbers {
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl Numbers {
    pub fn parse<S: AsRef<str>>(inputs: &[S]) -> Result<Self, InputError> {
        let ints: Option<Vec<i64>> = inputs
            .iter()
            .map(|input| input.as_ref().trim().parse::<i64>().ok())
            .collect();
        if let Some(ints) = ints {
            return Ok(Numbers::Ints(ints));
        }

        inputs
            .iter()
            .map(|input| {
                let input = input.as_ref().trim();
                input
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| InputError::InvalidNumber {
                        value: input.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Numbers::Floats)
    }

    pub fn len(&self) -> usize {
        match self {
            Numbers::Ints(values) => values.len(),
            Numbers::Floats(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Each input paired with its running total, both rendered as text
    pub fn running_totals(&self) -> Result<Vec<(String, String)>, InputError> {
        Ok(match self {
            Numbers::Ints(values) => values
                .iter()
                .zip(checked_cumulative_sum(values)?)
                .map(|(value, total)| (value.to_string(), total.to_string()))
                .collect(),
            Numbers::Floats(values) => values
                .iter()
                .zip(checked_float_cumulative_sum(values)?)
                .map(|(value, total)| (value.to_string(), total.to_string()))
                .collect(),
        })
    }

    /// Running totals as JSON numbers
    pub fn totals_json(&self) -> Result<serde_json::Value, InputError> {
        Ok(match self {
            Numbers::Ints(values) => serde_json::Value::from(checked_cumulative_sum(values)?),
            Numbers::Floats(values) => {
                serde_json::Value::from(checked_float_cumulative_sum(values)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumulative_sum_of_integers() {
        let totals: Vec<i32> = cumulative_sum(vec![1, 2, 3, 4]).collect();
        assert_eq!(totals, vec![1, 3, 6, 10]);
    }

    #[test]
    fn test_cumulative_sum_of_empty_input() {
        let totals: Vec<i64> = cumulative_sum(Vec::<i64>::new()).collect();
        assert!(totals.is_empty());
    }

    #[test]
    fn test_cumulative_sum_is_lazy() {
        let mut totals = (1..).cumulative_sum();
        assert_eq!(totals.next(), Some(1));
        assert_eq!(totals.next(), Some(3));
        assert_eq!(totals.next(), Some(6));
    }

    #[test]
    fn test_cumulative_sum_of_floats() {
        let totals: Vec<f64> = [0.5, 0.25, 0.25].into_iter().cumulative_sum().collect();
        assert_eq!(totals, vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_checked_cumulative_sum_reports_overflow_index() {
        assert_eq!(checked_cumulative_sum(&[1, 2, 3]).ok(), Some(vec![1, 3, 6]));

        let err = checked_cumulative_sum(&[1, i64::MAX, 5]);
        assert!(matches!(err, Err(InputError::Overflow { index: 1 })));
    }

    #[test]
    fn test_float_totals_report_overflow_index() {
        assert_eq!(
            checked_float_cumulative_sum(&[1.5, -0.5]).ok(),
            Some(vec![1.5, 1.0])
        );

        let err = checked_float_cumulative_sum(&[1.0, 1e308, 1e308]);
        assert!(matches!(err, Err(InputError::Overflow { index: 2 })));

        let numbers = Numbers::Floats(vec![1e308, 1e308]);
        assert!(matches!(
            numbers.totals_json(),
            Err(InputError::Overflow { index: 1 })
        ));
        assert!(numbers.running_totals().is_err());
    }

    #[test]
    fn test_numbers_parse_rejects_non_finite() {
        for input in ["inf", "NaN", "-infinity"] {
            assert!(matches!(
                Numbers::parse(&["1.5", input]),
                Err(InputError::InvalidNumber { .. })
            ));
        }
    }

    #[test]
    fn test_numbers_parse_prefers_integers() {
        assert_eq!(
            Numbers::parse(&["1", " 2", "-3"]).ok(),
            Some(Numbers::Ints(vec![1, 2, -3]))
        );
        assert_eq!(
            Numbers::parse(&["1", "2.5"]).ok(),
            Some(Numbers::Floats(vec![1.0, 2.5]))
        );
    }

    #[test]
    fn test_numbers_parse_rejects_garbage() {
        let err = Numbers::parse(&["1", "two"]);
        assert!(matches!(
            err,
            Err(InputError::InvalidNumber { ref value }) if value == "two"
        ));
    }

    #[test]
    fn test_running_totals() {
        let numbers = Numbers::parse(&["1", "2", "3", "4"]).expect("valid numbers");
        let rows = numbers.running_totals().expect("no overflow");
        assert_eq!(rows.last(), Some(&("4".to_string(), "10".to_string())));
        assert_eq!(
            numbers.totals_json().expect("no overflow"),
            serde_json::json!([1, 3, 6, 10])
        );
    }
}
