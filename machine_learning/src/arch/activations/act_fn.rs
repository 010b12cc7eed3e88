use super::{Relu, Sigmoid};

/// An element-wise activation function applied after a dense layer.
#[derive(Clone, Debug)]
pub enum ActFn {
    Relu(Relu),
    Sigmoid(Sigmoid),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(x),
            Self::Sigmoid(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(x),
            Self::Sigmoid(a) => a.df(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_cuts_negatives() {
        let act = ActFn::relu();
        assert_eq!(act.f(-2.0), 0.0);
        assert_eq!(act.f(3.0), 3.0);
        assert_eq!(act.df(-2.0), 0.0);
        assert_eq!(act.df(3.0), 1.0);
    }

    #[test]
    fn sigmoid_is_centered_at_half_amplitude() {
        let act = ActFn::sigmoid(2.0);
        assert!((act.f(0.0) - 1.0).abs() < 1e-6);
        assert!((act.df(0.0) - 0.5).abs() < 1e-6);
    }
}
