//! The type lattice: a `(Qualifier, BaseType)` pair and the compatibility /
//! inference rules the analyzer runs over it.

use std::fmt;

/// Pine's "how often does this value change" axis, ordered loosest-to-widest
/// so assignment compatibility is a simple rank comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Qualifier {
    Const,
    Input,
    Simple,
    Series,
}

impl Qualifier {
    fn rank(self) -> u8 {
        self as u8
    }

    fn as_str(self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Input => "input",
            Qualifier::Simple => "simple",
            Qualifier::Series => "series",
        }
    }

    fn parse(word: &str) -> Option<Qualifier> {
        match word {
            "const" => Some(Qualifier::Const),
            "input" => Some(Qualifier::Input),
            "simple" => Some(Qualifier::Simple),
            "series" => Some(Qualifier::Series),
            _ => None,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BaseType {
    Int,
    Float,
    Bool,
    String,
    Color,
    Void,
    Na,
    Any,
    Array(Box<BaseType>),
    Map(Box<BaseType>, Box<BaseType>),
    Matrix(Box<BaseType>),
    Named(String),
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Int => write!(f, "int"),
            BaseType::Float => write!(f, "float"),
            BaseType::Bool => write!(f, "bool"),
            BaseType::String => write!(f, "string"),
            BaseType::Color => write!(f, "color"),
            BaseType::Void => write!(f, "void"),
            BaseType::Na => write!(f, "na"),
            BaseType::Any => write!(f, "any"),
            BaseType::Array(inner) => write!(f, "array<{}>", inner),
            BaseType::Map(k, v) => write!(f, "map<{},{}>", k, v),
            BaseType::Matrix(inner) => write!(f, "matrix<{}>", inner),
            BaseType::Named(name) => write!(f, "{}", name),
        }
    }
}

impl BaseType {
    fn parse(word: &str) -> BaseType {
        match word {
            "int" => BaseType::Int,
            "float" => BaseType::Float,
            "bool" => BaseType::Bool,
            "string" => BaseType::String,
            "color" => BaseType::Color,
            "void" => BaseType::Void,
            "na" => BaseType::Na,
            "any" => BaseType::Any,
            other => BaseType::Named(other.to_string()),
        }
    }
}

/// `(Qualifier, BaseType)`, rendered as the original's `"series int"`-style
/// strings for diagnostic messages.
#[derive(Clone, Debug, PartialEq)]
pub struct PineType {
    pub qualifier: Qualifier,
    pub base: BaseType,
}

impl PineType {
    pub fn new(qualifier: Qualifier, base: BaseType) -> Self {
        PineType { qualifier, base }
    }

    pub fn series(base: BaseType) -> Self {
        PineType::new(Qualifier::Series, base)
    }

    pub fn constant(base: BaseType) -> Self {
        PineType::new(Qualifier::Const, base)
    }

    pub fn series_any() -> Self {
        PineType::series(BaseType::Any)
    }

    pub fn void() -> Self {
        PineType::series(BaseType::Void)
    }

    /// Parses the original's `"<qualifier> <base>"` string form, defaulting
    /// an unqualified word to `series` (matching `TypeSystem.parse_type`).
    pub fn parse(text: &str) -> PineType {
        let mut parts = text.splitn(2, ' ');
        let first = parts.next().unwrap_or("");
        match parts.next() {
            Some(rest) => match Qualifier::parse(first) {
                Some(q) => PineType::new(q, BaseType::parse(rest)),
                None => PineType::series(BaseType::parse(text)),
            },
            None => PineType::series(BaseType::parse(first)),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.base, BaseType::Any)
    }

    pub fn is_na(&self) -> bool {
        matches!(self.base, BaseType::Na)
    }
}

impl fmt::Display for PineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.qualifier, self.base)
    }
}

/// `na` is compatible with everything; `any` absorbs everything both ways;
/// otherwise the source qualifier must be no wider than the target's, and
/// the base types must match except for the implicit `int -> float` widen.
pub fn is_compatible(target: &PineType, source: &PineType) -> bool {
    if target.is_any() || source.is_any() || source.is_na() {
        return true;
    }
    if source.qualifier.rank() > target.qualifier.rank() {
        return false;
    }
    if target.base == source.base {
        return true;
    }
    matches!((&target.base, &source.base), (BaseType::Float, BaseType::Int))
}

pub fn infer_binary_op(left: &PineType, op: &str, right: &PineType) -> PineType {
    let result_qualifier = left.qualifier.max(right.qualifier);

    match op {
        "+" | "-" | "*" | "/" | "%" => {
            if left.base == BaseType::Float || right.base == BaseType::Float {
                PineType::new(result_qualifier, BaseType::Float)
            } else if left.base == BaseType::Int && right.base == BaseType::Int {
                PineType::new(result_qualifier, BaseType::Int)
            } else if op == "+" && (left.base == BaseType::String || right.base == BaseType::String) {
                PineType::new(result_qualifier, BaseType::String)
            } else {
                PineType::new(result_qualifier, left.base.clone())
            }
        }
        "==" | "!=" | "<" | ">" | "<=" | ">=" | "and" | "or" => {
            PineType::new(result_qualifier, BaseType::Bool)
        }
        _ => PineType::new(result_qualifier, left.base.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_is_compatible_with_anything() {
        let target = PineType::series(BaseType::Int);
        let na = PineType::series(BaseType::Na);
        assert!(is_compatible(&target, &na));
    }

    #[test]
    fn int_widens_to_float() {
        let target = PineType::series(BaseType::Float);
        let source = PineType::series(BaseType::Int);
        assert!(is_compatible(&target, &source));
    }

    #[test]
    fn wider_qualifier_rejected() {
        let target = PineType::new(Qualifier::Simple, BaseType::Int);
        let source = PineType::new(Qualifier::Series, BaseType::Int);
        assert!(!is_compatible(&target, &source));
    }

    #[test]
    fn comparison_always_yields_bool() {
        let left = PineType::series(BaseType::Int);
        let right = PineType::series(BaseType::Float);
        let result = infer_binary_op(&left, "<", &right);
        assert_eq!(result.base, BaseType::Bool);
    }

    #[test]
    fn addition_promotes_to_float() {
        let left = PineType::series(BaseType::Int);
        let right = PineType::series(BaseType::Float);
        let result = infer_binary_op(&left, "+", &right);
        assert_eq!(result.base, BaseType::Float);
    }

    #[test]
    fn display_matches_original_convention() {
        let t = PineType::series(BaseType::Int);
        assert_eq!(t.to_string(), "series int");
    }
}
