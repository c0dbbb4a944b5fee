use miette::SourceSpan;

/// Every object literal recovered from a configuration file.
///
/// `roots` holds the outermost literals in document order; literals nested in
/// them are reachable through their members.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ConfigDocument {
    pub roots: Vec<Expr>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Expr {
    pub fn get_source_span(&self) -> SourceSpan {
        (self.pos_start, self.pos_end - self.pos_start).into()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprKind {
    Object(Vec<Member>),
    Array(Vec<Expr>),
    String(String),
    Number(f64),
    /// A template literal without interpolation.
    Template(String),
    /// Any expression whose value is not statically known. Object literals
    /// found inside it are kept so ancestry can still be traced through
    /// calls like `defineConfig({ ... })`.
    Dynamic(Vec<Expr>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Member {
    Pair(Pair),
    Spread(Expr),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Pair {
    /// `None` for computed keys (`[name]: value`).
    pub key: Option<String>,
    pub value: Expr,
}
