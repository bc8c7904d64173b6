use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

use usvg::fontdb;

use crate::foundation::error::{ReelError, ReelResult};

/// Family names tried, in order, when the requested family is not installed.
const SANS_FALLBACKS: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
];

/// A concrete face chosen for a text element.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Family name of the chosen face.
    pub family: String,
    /// Raw font file bytes (shared with the book's cache).
    pub data: Arc<Vec<u8>>,
    /// Face index inside `data` (non-zero for collections).
    pub index: u32,
    /// CSS weight of the chosen face.
    pub weight: u16,
    /// Whether the chosen face is italic/oblique.
    pub italic: bool,
    /// `true` when the requested family was unavailable and another face stands in.
    pub fallback: bool,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .field("weight", &self.weight)
            .field("italic", &self.italic)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Font database shared by all rasterizer threads.
///
/// Loading scans system fonts once; face bytes are read lazily and cached.
pub struct FontBook {
    db: fontdb::Database,
    data_cache: Mutex<HashMap<fontdb::ID, Arc<Vec<u8>>>>,
}

impl FontBook {
    /// A book with no faces. Glyphs render as empty geometry.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
            data_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load system fonts, a `fonts/` directory next to the working directory, and `extra_dirs`.
    #[tracing::instrument(skip_all, fields(extra_dirs = extra_dirs.len()))]
    pub fn load(extra_dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        load_fonts_from_dir(&mut db, Path::new("fonts"));
        for dir in extra_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font book loaded");
        Self {
            db,
            data_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load only the fonts found in `dirs` (no system scan).
    pub fn from_dirs(dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        Self {
            db,
            data_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide book with system fonts, loaded on first use.
    pub fn shared() -> Arc<FontBook> {
        static SHARED: OnceLock<Arc<FontBook>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(FontBook::load(&[])))
            .clone()
    }

    /// Add a font file to the book.
    pub fn add_font_file(&mut self, path: &Path) -> ReelResult<()> {
        self.db
            .load_font_file(path)
            .map_err(|e| ReelError::font(format!("load font '{}': {e}", path.display())))
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    /// Resolve a CSS `font-family` value to a face.
    ///
    /// Never fails for a non-empty book: an unknown family yields a fallback face with
    /// `fallback = true`. Returns `None` only when the book has no usable faces.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> Option<ResolvedFont> {
        let weight = if bold {
            fontdb::Weight::BOLD
        } else {
            fontdb::Weight::NORMAL
        };
        let style = if italic {
            fontdb::Style::Italic
        } else {
            fontdb::Style::Normal
        };

        for name in parse_family_list(family) {
            let families = [generic_or_named(&name)];
            if let Some(id) = self.query(&families, weight, style)
                && let Some(font) = self.load_face(id, false)
            {
                return Some(font);
            }
        }

        let fallback = self.fallback_face(weight, style);
        match fallback.and_then(|id| self.load_face(id, true)) {
            Some(font) => {
                tracing::warn!(
                    requested = family,
                    resolved = %font.family,
                    "font family unavailable, using fallback face"
                );
                Some(font)
            }
            None => {
                tracing::warn!(requested = family, "no usable font faces; glyphs will be empty");
                None
            }
        }
    }

    fn query(
        &self,
        families: &[fontdb::Family<'_>],
        weight: fontdb::Weight,
        style: fontdb::Style,
    ) -> Option<fontdb::ID> {
        self.db.query(&fontdb::Query {
            families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style,
        })
    }

    fn fallback_face(&self, weight: fontdb::Weight, style: fontdb::Style) -> Option<fontdb::ID> {
        for name in SANS_FALLBACKS {
            if let Some(id) = self.query(&[fontdb::Family::Name(name)], weight, style) {
                return Some(id);
            }
        }

        // Deterministic pick independent of directory scan order.
        self.db
            .faces()
            .min_by_key(|face| {
                let style_miss = face.style != style;
                let weight_diff = face.weight.0.abs_diff(weight.0);
                let family = face
                    .families
                    .first()
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default();
                (
                    style_miss,
                    weight_diff,
                    family,
                    face.post_script_name.clone(),
                )
            })
            .map(|face| face.id)
    }

    fn load_face(&self, id: fontdb::ID, fallback: bool) -> Option<ResolvedFont> {
        let face = self.db.face(id)?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| face.post_script_name.clone());

        let data = {
            let mut cache = self.data_cache.lock().ok()?;
            match cache.get(&id) {
                Some(bytes) => bytes.clone(),
                None => {
                    let bytes = self.db.with_face_data(id, |data, _| data.to_vec())?;
                    let bytes = Arc::new(bytes);
                    cache.insert(id, bytes.clone());
                    bytes
                }
            }
        };

        Some(ResolvedFont {
            family,
            data,
            index: face.index,
            weight: face.weight.0,
            italic: face.style != fontdb::Style::Normal,
            fallback,
        })
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

/// Split a CSS font-family list into unquoted names.
pub(crate) fn parse_family_list(family: &str) -> Vec<String> {
    family
        .split(',')
        .map(|part| part.trim().trim_matches(['"', '\'']).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn generic_or_named(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    let mut paths: Vec<PathBuf> = rd.flatten().map(|entry| entry.path()).collect();
    paths.sort();
    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
