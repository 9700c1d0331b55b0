use nalgebra::base::*;
use std::fmt;

/// Scalar field giving the target element size at each point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeField {
    /// Same size everywhere
    Constant(f64),
    /// `2*sin((x+y)/5) + 3`
    Sinusoidal,
}

impl SizeField {
    /// MathEval expression understood by the meshing engine
    pub fn expression(&self) -> String {
        match self {
            SizeField::Constant(v) => format!("{}", v),
            SizeField::Sinusoidal => "2*Sin((x+y)/5) + 3".to_string(),
        }
    }

    pub fn evaluate(&self, point: &Vector3<f64>) -> f64 {
        match self {
            SizeField::Constant(v) => *v,
            SizeField::Sinusoidal => 2.0 * ((point[0] + point[1]) / 5.0).sin() + 3.0,
        }
    }

    /// Smallest and largest size over a set of points
    pub fn range<'a, I>(&self, points: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = &'a Vector3<f64>>,
    {
        points.into_iter().fold(None, |acc, p| {
            let s = self.evaluate(p);
            match acc {
                None => Some((s, s)),
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
            }
        })
    }
}

/// How element sizes are prescribed for a build
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeStrategy {
    /// Field evaluated everywhere in the domain
    Background(SizeField),
    /// One size on every point entity
    Explicit(f64),
}

impl fmt::Display for SizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeStrategy::Background(field) => write!(f, "background field F = \"{}\"", field.expression()),
            SizeStrategy::Explicit(size) => write!(f, "explicit size {} on all points", size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinusoidal_matches_expression() {
        let field = SizeField::Sinusoidal;
        assert_eq!(field.expression(), "2*Sin((x+y)/5) + 3");
        assert!((field.evaluate(&Vector3::new(0.0, 0.0, 7.0)) - 3.0).abs() < 1e-12);
        let p = Vector3::new(2.5, 5.0, 0.0);
        let expected = 2.0 * (1.5f64).sin() + 3.0;
        assert!((field.evaluate(&p) - expected).abs() < 1e-12);
    }

    #[test]
    fn constant_field() {
        let field = SizeField::Constant(4.0);
        assert_eq!(field.expression(), "4");
        assert_eq!(field.evaluate(&Vector3::new(10.0, -3.0, 1.0)), 4.0);
    }

    #[test]
    fn range_over_points() {
        let pts = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(5.0 * std::f64::consts::FRAC_PI_2, 0.0, 0.0)];
        let (lo, hi) = SizeField::Sinusoidal.range(pts.iter()).unwrap();
        assert!((lo - 3.0).abs() < 1e-12);
        assert!((hi - 5.0).abs() < 1e-12);
        assert!(SizeField::Constant(1.0).range(std::iter::empty::<&Vector3<f64>>()).is_none());
    }
}
