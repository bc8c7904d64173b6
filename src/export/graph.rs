/// Label of the final composited video stream.
pub const OUTPUT_LABEL: &str = "vout";

/// Chained overlay graph: input `0` is the video, inputs `1..=n` are overlay images in
/// z-order, each composited at the origin on top of the previous result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterGraph {
    overlays: usize,
}

impl FilterGraph {
    pub fn new(overlays: usize) -> Self {
        Self { overlays }
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays
    }

    /// Video input plus one image input per overlay.
    pub fn input_count(&self) -> usize {
        self.overlays + 1
    }

    pub fn link_count(&self) -> usize {
        self.overlays
    }

    pub fn is_empty(&self) -> bool {
        self.overlays == 0
    }

    /// `-map` argument selecting the composited stream.
    pub fn output_map(&self) -> String {
        format!("[{OUTPUT_LABEL}]")
    }
}

impl std::fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 1..=self.overlays {
            if i > 1 {
                f.write_str(";")?;
            }
            let base = if i == 1 {
                "0:v".to_string()
            } else {
                format!("v{}", i - 1)
            };
            let out = if i == self.overlays {
                OUTPUT_LABEL.to_string()
            } else {
                format!("v{i}")
            };
            write!(f, "[{base}][{i}:v]overlay=0:0[{out}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/graph.rs"]
mod tests;
