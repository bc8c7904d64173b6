/// Convenience result type used across reeltext.
pub type ReelResult<T> = Result<T, ReelError>;

/// Stage of an export in which a fatal error happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportStage {
    /// Cold start / warm check of the engine.
    EngineLoad,
    /// Fetching and staging the source video.
    Fetch,
    /// Rasterizing and staging overlay images.
    Rasterize,
    /// Running the engine command.
    Execute,
    /// Reading the output file back from the engine.
    Readback,
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::EngineLoad => "engine load",
            Self::Fetch => "video fetch",
            Self::Rasterize => "overlay rasterization",
            Self::Execute => "engine execution",
            Self::Readback => "output readback",
        };
        f.write_str(name)
    }
}

/// Top-level error taxonomy used by the rasterizer, engines and the export pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Structurally invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Font database problems surfaced by explicit font APIs.
    #[error("font error: {0}")]
    Font(String),

    /// Drawing surface acquisition or image encoding failures.
    #[error("raster error: {0}")]
    Raster(String),

    /// Engine load, file store or execution failures.
    #[error("engine error: {0}")]
    Engine(String),

    /// Source video could not be fetched.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A fatal error annotated with the export stage it happened in.
    #[error("export failed during {stage}: {source}")]
    Stage {
        /// Failing stage.
        stage: ExportStage,
        /// Underlying error.
        #[source]
        source: Box<ReelError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`ReelError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`ReelError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`ReelError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Annotate `self` with the export stage it happened in.
    ///
    /// Errors that already carry a stage keep the innermost one.
    pub fn at_stage(self, stage: ExportStage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Return the export stage this error was annotated with, if any.
    pub fn stage(&self) -> Option<ExportStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
