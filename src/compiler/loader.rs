use crate::compiler::core::Compiler;
use crate::compiler::template::Template;
use crate::error::{Result, TurkError};
use std::fs;
use std::path::Path;

pub fn load_template(path: &Path) -> Result<Template> {
    let markup = fs::read_to_string(path).map_err(|e| TurkError::io(path, e))?;
    Compiler::new().compile(&markup)
}
