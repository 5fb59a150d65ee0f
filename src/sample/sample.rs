use std::fmt;

use crate::loss::squared_error::SquaredError;

/// One feature vector together with the network's response to it.
///
/// `output`, `error` and `recognized_class` stay `None` until the sample has
/// been run through a network at least once.
#[derive(Debug, Clone)]
pub struct Sample {
    input: Vec<f64>,
    output: Option<Vec<f64>>,
    error: Option<Vec<f64>>,
    actual_class: Option<usize>,
    recognized_class: Option<usize>,
}

impl Sample {
    /// Builds a sample from a borrowed feature buffer; the values are copied
    /// so the caller may reuse the buffer afterwards.
    pub fn new(input: &[f64], actual_class: Option<usize>) -> Sample {
        Sample {
            input: input.to_vec(),
            output: None,
            error: None,
            actual_class,
            recognized_class: None,
        }
    }

    pub fn labeled(input: &[f64], actual_class: usize) -> Sample {
        Sample::new(input, Some(actual_class))
    }

    pub fn unlabeled(input: &[f64]) -> Sample {
        Sample::new(input, None)
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> Option<&[f64]> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&[f64]> {
        self.error.as_deref()
    }

    pub fn actual_class(&self) -> Option<usize> {
        self.actual_class
    }

    pub fn recognized_class(&self) -> Option<usize> {
        self.recognized_class
    }

    /// Stores the network's response and derives the error vector and the
    /// recognized class from it.
    ///
    /// The recognized class is the first index holding the maximum output.
    pub fn process_output(&mut self, output: &[f64]) {
        let buffer = self.output.get_or_insert_with(Vec::new);
        buffer.clear();
        buffer.extend_from_slice(output);

        self.error = Some(SquaredError::one_hot_error(output, self.actual_class));

        let mut best = 0;
        for (i, value) in output.iter().enumerate() {
            if *value > output[best] {
                best = i;
            }
        }
        self.recognized_class = if output.is_empty() { None } else { Some(best) };
    }

    /// Σ(target - output)², or `None` before the first forward pass.
    pub fn squared_error(&self) -> Option<f64> {
        self.error.as_deref().map(SquaredError::loss)
    }

    /// True only for a labeled sample whose recognized class matches.
    pub fn correct(&self) -> bool {
        matches!(
            (self.actual_class, self.recognized_class),
            (Some(actual), Some(recognized)) if actual == recognized
        )
    }
}

fn write_vector(f: &mut fmt::Formatter<'_>, values: Option<&[f64]>) -> fmt::Result {
    match values {
        None => write!(f, "null;"),
        Some(values) => {
            for v in values {
                write!(f, "{v:.4}; ")?;
            }
            Ok(())
        }
    }
}

fn write_label(f: &mut fmt::Formatter<'_>, label: Option<usize>) -> fmt::Result {
    match label {
        Some(label) => write!(f, "{label}"),
        None => write!(f, "undefined"),
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample class: ")?;
        write_label(f, self.actual_class)?;
        write!(f, "\nInput: ")?;
        write_vector(f, Some(self.input.as_slice()))?;
        write!(f, "\nOutput: ")?;
        write_vector(f, self.output())?;
        write!(f, "\nError: ")?;
        write_vector(f, self.error())?;
        write!(f, "\nRecognized: ")?;
        write_label(f, self.recognized_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_copied_at_construction() {
        let mut buffer = vec![1.0, 2.0, 3.0];
        let sample = Sample::labeled(&buffer, 0);
        buffer[0] = 42.0;
        buffer.push(7.0);
        assert_eq!(sample.input(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn fresh_sample_has_no_response() {
        let sample = Sample::labeled(&[0.0; 4], 1);
        assert!(sample.output().is_none());
        assert!(sample.error().is_none());
        assert!(sample.recognized_class().is_none());
        assert!(sample.squared_error().is_none());
        assert!(!sample.correct());
    }

    #[test]
    fn highest_output_wins() {
        let mut sample = Sample::labeled(&[0.0; 4], 2);
        sample.process_output(&[0.1, 0.2, 0.9, 0.05]);
        assert_eq!(sample.recognized_class(), Some(2));
        assert!(sample.correct());

        let error = sample.error().unwrap();
        assert!((error[2] - 0.1).abs() < 1e-12);
        assert!((error[0] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn ties_resolve_to_the_first_index() {
        let mut sample = Sample::labeled(&[0.0], 1);
        sample.process_output(&[0.3, 0.7, 0.7, 0.1]);
        assert_eq!(sample.recognized_class(), Some(1));
    }

    #[test]
    fn unlabeled_sample_is_never_correct() {
        let mut sample = Sample::unlabeled(&[0.0]);
        sample.process_output(&[0.9, 0.1]);
        assert_eq!(sample.recognized_class(), Some(0));
        assert!(!sample.correct());
    }

    #[test]
    fn squared_error_sums_over_outputs() {
        let mut sample = Sample::labeled(&[0.0], 0);
        sample.process_output(&[0.5, 0.5]);
        assert!((sample.squared_error().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn display_marks_missing_response() {
        let text = Sample::unlabeled(&[1.0]).to_string();
        assert!(text.contains("Output: null;"));
        assert!(text.contains("Recognized: undefined"));
    }
}
