/// What the per-frame draw produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Lit surface only.
    #[default]
    Shaded,
    /// Lit surface plus edge and normal overlay.
    Debug,
}

impl RenderMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Shaded => Self::Debug,
            Self::Debug => Self::Shaded,
        }
    }

    pub fn draws_overlay(self) -> bool {
        matches!(self, Self::Debug)
    }
}
