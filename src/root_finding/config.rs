//! Shared configuration for root-finding algorithms.
//!
//! Provides [`CommonCfg`] with the default tolerance and iteration limit,
//! embedded in every algorithm config.
//!
//! [`CommonCfg`] universal fields
//! ├ `epsilon`  : tolerance on |f(x)| and on the width/step measure
//! └ `max_iter` : iteration cap (optional)
//!
//! [`CommonCfg::new`] initializes configuration with default values.


pub const DEFAULT_EPSILON: f64 = 1e-6;


#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CommonCfg {
    epsilon:  f64,
    max_iter: Option<usize>,
}

impl CommonCfg {
    pub fn new() -> Self {
        Self {
            epsilon  : DEFAULT_EPSILON,
            max_iter : None
        }
    }

    // getters
    pub fn epsilon(&self)  -> f64 { self.epsilon }
    pub fn max_iter(&self) -> Option<usize> { self.max_iter }

    // setters (internal)
    pub(crate) fn with_epsilon  (&mut self, v: f64)   { self.epsilon  = v; }
    pub(crate) fn with_max_iter (&mut self, v: usize) { self.max_iter = Some(v); }
}

impl Default for CommonCfg {
    fn default() -> Self { Self::new() }
}

macro_rules! impl_common_cfg {
    ($cfg:ty) => {
        impl $cfg {
            /// Tolerance shared by the |f(x)| test and the width/step test.
            /// `0.0` is accepted; the run is then bounded by `max_iter` only.
            pub fn set_epsilon(
                mut self, v: f64
            ) -> Result<Self, $crate::root_finding::errors::ToleranceError> {
                if !v.is_finite() || v < 0.0 {
                    return Err(
                        $crate::root_finding::errors::ToleranceError::InvalidEpsilon { got: v }
                    );
                }
                self.common.with_epsilon(v);
                Ok(self)
            }
            pub fn set_max_iter(
                mut self, v: usize
            ) -> Result<Self, $crate::root_finding::errors::RootFindingError> {
                if v == 0 {
                    return Err(
                        $crate::root_finding::errors::RootFindingError::InvalidMaxIter { got: v }
                    );
                }
                self.common.with_max_iter(v);
                Ok(self)
            }

            #[inline] #[must_use] pub fn epsilon(&self)  -> f64 { self.common.epsilon() }
            #[inline] #[must_use] pub fn max_iter(&self) -> Option<usize> { self.common.max_iter() }
        }

        impl Default for $cfg {
            fn default() -> Self { Self::new() }
        }
    };
}
pub(crate) use impl_common_cfg;
