use super::Sigmoid;

/// The function applied to the linear combination of features before it is
/// compared against the target.
#[derive(Clone, Copy, Debug)]
pub enum ActFn {
    Identity,
    Sigmoid(Sigmoid),
}

impl ActFn {
    pub fn identity() -> Self {
        ActFn::Identity
    }

    pub fn sigmoid() -> Self {
        ActFn::Sigmoid(Sigmoid::new())
    }

    pub fn f(&self, z: f64) -> f64 {
        match self {
            ActFn::Identity => z,
            ActFn::Sigmoid(a) => a.f(z),
        }
    }
}
