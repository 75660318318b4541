/// 编译后的模板：head + (repeat × N) + tail
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub head: String,
    /// Instantiated once per task; named fields carry a `__${index}` suffix.
    pub repeat: String,
    pub tail: String,
}
