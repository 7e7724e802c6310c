//! The built-in function/variable catalog. A representative subset of the
//! real Pine Script standard library — broad enough to exercise every
//! resolution path an analyzer can take, not a transcription of the full
//! reference documentation.

use crate::types::{BaseType, PineType, Qualifier};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct BuiltinParam {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub params: &'static [BuiltinParam],
    pub return_type: &'static str,
    pub variadic: bool,
}

#[derive(Clone, Debug)]
pub struct BuiltinVariable {
    pub name: &'static str,
    pub type_str: &'static str,
}

macro_rules! param {
    ($name:literal) => {
        BuiltinParam { name: $name, required: true }
    };
    ($name:literal, optional) => {
        BuiltinParam { name: $name, required: false }
    };
}

macro_rules! func {
    ($name:literal, [$($p:expr),* $(,)?], $ret:literal) => {
        BuiltinFunction { name: $name, params: &[$($p),*], return_type: $ret, variadic: false }
    };
    ($name:literal, variadic, $ret:literal) => {
        BuiltinFunction { name: $name, params: &[], return_type: $ret, variadic: true }
    };
}

static FUNCTIONS: &[BuiltinFunction] = &[
    func!("plot", [param!("series"), param!("title", optional), param!("color", optional)], "void"),
    func!("plotshape", [param!("series"), param!("title", optional)], "void"),
    func!("plotchar", [param!("series"), param!("char", optional)], "void"),
    func!("hline", [param!("price"), param!("title", optional)], "void"),
    func!("bgcolor", [param!("color")], "void"),
    func!("barcolor", [param!("color")], "void"),
    func!("fill", [param!("hline1"), param!("hline2")], "void"),
    func!("alertcondition", [param!("condition"), param!("title", optional)], "void"),
    func!("alert", [param!("message"), param!("freq", optional)], "void"),
    func!("indicator", variadic, "void"),
    func!("strategy", variadic, "void"),
    func!("library", [param!("title")], "void"),
    func!("export", [param!("target")], "void"),
    func!("input.int", [param!("defval"), param!("title", optional)], "simple int"),
    func!("input.float", [param!("defval"), param!("title", optional)], "simple float"),
    func!("input.bool", [param!("defval"), param!("title", optional)], "simple bool"),
    func!("input.string", [param!("defval"), param!("title", optional)], "simple string"),
    func!("input.source", [param!("defval"), param!("title", optional)], "series float"),
    func!("input.color", [param!("defval"), param!("title", optional)], "simple color"),
    func!("input.timeframe", [param!("defval"), param!("title", optional)], "simple string"),
    func!("math.abs", [param!("number")], "series float"),
    func!("math.max", variadic, "series float"),
    func!("math.min", variadic, "series float"),
    func!("math.round", [param!("number")], "series float"),
    func!("math.floor", [param!("number")], "series int"),
    func!("math.ceil", [param!("number")], "series int"),
    func!("math.pow", [param!("base"), param!("exponent")], "series float"),
    func!("math.sqrt", [param!("number")], "series float"),
    func!("math.log", [param!("number")], "series float"),
    func!("math.log10", [param!("number")], "series float"),
    func!("math.sign", [param!("number")], "series int"),
    func!("math.random", [param!("min", optional), param!("max", optional)], "series float"),
    func!("math.avg", variadic, "series float"),
    func!("math.sum", [param!("source"), param!("length")], "series float"),
    func!("str.tostring", [param!("value"), param!("format", optional)], "series string"),
    func!("str.tonumber", [param!("text")], "series float"),
    func!("str.length", [param!("text")], "series int"),
    func!("str.upper", [param!("text")], "series string"),
    func!("str.lower", [param!("text")], "series string"),
    func!("str.contains", [param!("text"), param!("substring")], "series bool"),
    func!("str.replace", [param!("text"), param!("target"), param!("replacement")], "series string"),
    func!("str.split", [param!("text"), param!("separator")], "series array<string>"),
    func!("str.format", variadic, "series string"),
    func!("array.new_float", [param!("size", optional), param!("initial", optional)], "array<float>"),
    func!("array.new_int", [param!("size", optional), param!("initial", optional)], "array<int>"),
    func!("array.new_string", [param!("size", optional), param!("initial", optional)], "array<string>"),
    func!("array.push", [param!("id"), param!("value")], "void"),
    func!("array.pop", [param!("id")], "series any"),
    func!("array.get", [param!("id"), param!("index")], "series any"),
    func!("array.set", [param!("id"), param!("index"), param!("value")], "void"),
    func!("array.size", [param!("id")], "series int"),
    func!("array.clear", [param!("id")], "void"),
    func!("array.sort", [param!("id"), param!("order", optional)], "void"),
    func!("array.includes", [param!("id"), param!("value")], "series bool"),
    func!("ta.sma", [param!("source"), param!("length")], "series float"),
    func!("ta.ema", [param!("source"), param!("length")], "series float"),
    func!("ta.rma", [param!("source"), param!("length")], "series float"),
    func!("ta.wma", [param!("source"), param!("length")], "series float"),
    func!("ta.vwma", [param!("source"), param!("length")], "series float"),
    func!("ta.rsi", [param!("source"), param!("length")], "series float"),
    func!("ta.macd", [param!("source"), param!("fast"), param!("slow"), param!("signal")], "series float"),
    func!("ta.atr", [param!("length")], "series float"),
    func!("ta.stdev", [param!("source"), param!("length")], "series float"),
    func!("ta.highest", [param!("source"), param!("length")], "series float"),
    func!("ta.lowest", [param!("source"), param!("length")], "series float"),
    func!("ta.crossover", [param!("source1"), param!("source2")], "series bool"),
    func!("ta.crossunder", [param!("source1"), param!("source2")], "series bool"),
    func!("ta.barssince", [param!("condition")], "series int"),
    func!("ta.valuewhen", [param!("condition"), param!("source"), param!("occurrence")], "series float"),
    func!("ta.change", [param!("source"), param!("length", optional)], "series float"),
    func!("ta.cum", [param!("source")], "series float"),
    func!("color.new", [param!("color"), param!("transp")], "series color"),
    func!("color.rgb", [param!("red"), param!("green"), param!("blue"), param!("transp", optional)], "series color"),
    func!("color.from_gradient", [param!("value"), param!("bottom_value"), param!("top_value"), param!("bottom_color"), param!("top_color")], "series color"),
    func!("strategy.entry", [param!("id"), param!("direction"), param!("qty", optional)], "void"),
    func!("strategy.exit", [param!("id"), param!("from_entry", optional)], "void"),
    func!("strategy.close", [param!("id"), param!("comment", optional)], "void"),
    func!("strategy.close_all", [param!("comment", optional)], "void"),
    func!("strategy.cancel", [param!("id")], "void"),
    func!("strategy.order", [param!("id"), param!("direction"), param!("qty", optional)], "void"),
    func!("table.new", [param!("position"), param!("columns"), param!("rows")], "series table"),
    func!("table.cell", [param!("table_id"), param!("column"), param!("row"), param!("text", optional)], "void"),
    func!("line.new", [param!("x1"), param!("y1"), param!("x2"), param!("y2")], "series line"),
    func!("line.set_xy1", [param!("id"), param!("x"), param!("y")], "void"),
    func!("label.new", [param!("x"), param!("y"), param!("text", optional)], "series label"),
    func!("label.set_text", [param!("id"), param!("text")], "void"),
    func!("box.new", [param!("left"), param!("top"), param!("right"), param!("bottom")], "series box"),
    func!("request.security", [param!("symbol"), param!("timeframe"), param!("expression")], "series any"),
    func!("time", [param!("timeframe"), param!("session", optional)], "series int"),
    func!("timestamp", variadic, "series int"),
    func!("nz", [param!("source"), param!("replacement", optional)], "series float"),
    func!("na", [param!("value")], "series bool"),
    func!("fixnan", [param!("source")], "series float"),
];

static VARIABLES: &[BuiltinVariable] = &[
    BuiltinVariable { name: "open", type_str: "series float" },
    BuiltinVariable { name: "high", type_str: "series float" },
    BuiltinVariable { name: "low", type_str: "series float" },
    BuiltinVariable { name: "close", type_str: "series float" },
    BuiltinVariable { name: "volume", type_str: "series float" },
    BuiltinVariable { name: "time", type_str: "series int" },
    BuiltinVariable { name: "time_close", type_str: "series int" },
    BuiltinVariable { name: "bar_index", type_str: "series int" },
    BuiltinVariable { name: "last_bar_index", type_str: "series int" },
    BuiltinVariable { name: "timeframe.period", type_str: "simple string" },
    BuiltinVariable { name: "timeframe.multiplier", type_str: "simple int" },
    BuiltinVariable { name: "timeframe.isintraday", type_str: "simple bool" },
    BuiltinVariable { name: "syminfo.ticker", type_str: "simple string" },
    BuiltinVariable { name: "syminfo.currency", type_str: "simple string" },
    BuiltinVariable { name: "syminfo.root", type_str: "simple string" },
    BuiltinVariable { name: "strategy.position_size", type_str: "series float" },
    BuiltinVariable { name: "strategy.equity", type_str: "series float" },
    BuiltinVariable { name: "strategy.long", type_str: "const string" },
    BuiltinVariable { name: "strategy.short", type_str: "const string" },
    BuiltinVariable { name: "strategy.opentrades", type_str: "series int" },
    BuiltinVariable { name: "color.red", type_str: "const color" },
    BuiltinVariable { name: "color.green", type_str: "const color" },
    BuiltinVariable { name: "color.blue", type_str: "const color" },
    BuiltinVariable { name: "color.white", type_str: "const color" },
    BuiltinVariable { name: "color.black", type_str: "const color" },
    BuiltinVariable { name: "color.orange", type_str: "const color" },
    BuiltinVariable { name: "color.yellow", type_str: "const color" },
    BuiltinVariable { name: "color.purple", type_str: "const color" },
    BuiltinVariable { name: "color.gray", type_str: "const color" },
    BuiltinVariable { name: "na", type_str: "const na" },
    BuiltinVariable { name: "true", type_str: "const bool" },
    BuiltinVariable { name: "false", type_str: "const bool" },
    BuiltinVariable { name: "xloc.bar_index", type_str: "const string" },
    BuiltinVariable { name: "xloc.bar_time", type_str: "const string" },
    BuiltinVariable { name: "yloc.price", type_str: "const string" },
    BuiltinVariable { name: "yloc.abovebar", type_str: "const string" },
    BuiltinVariable { name: "yloc.belowbar", type_str: "const string" },
    BuiltinVariable { name: "position.top_right", type_str: "const string" },
    BuiltinVariable { name: "position.bottom_left", type_str: "const string" },
    BuiltinVariable { name: "barstate.isfirst", type_str: "series bool" },
    BuiltinVariable { name: "barstate.islast", type_str: "series bool" },
    BuiltinVariable { name: "barstate.isrealtime", type_str: "series bool" },
    BuiltinVariable { name: "barstate.ishistory", type_str: "series bool" },
    BuiltinVariable { name: "session.ismarket", type_str: "series bool" },
    BuiltinVariable { name: "chart.bg_color", type_str: "input color" },
];

pub static FUNCTION_TABLE: Lazy<FxHashMap<&'static str, &'static BuiltinFunction>> = Lazy::new(|| {
    FUNCTIONS.iter().map(|f| (f.name, f)).collect()
});

pub static VARIABLE_TABLE: Lazy<FxHashMap<&'static str, &'static BuiltinVariable>> = Lazy::new(|| {
    VARIABLES.iter().map(|v| (v.name, v)).collect()
});

pub fn lookup_function(name: &str) -> Option<&'static BuiltinFunction> {
    FUNCTION_TABLE.get(name).copied()
}

pub fn lookup_variable(name: &str) -> Option<&'static BuiltinVariable> {
    VARIABLE_TABLE.get(name).copied()
}

pub fn variable_type(var: &BuiltinVariable) -> PineType {
    PineType::parse(var.type_str)
}

pub fn min_required_args(func: &BuiltinFunction) -> usize {
    func.params.iter().filter(|p| p.required).count()
}

/// `series any` qualifier used whenever a builtin's declared return type
/// can't be parsed as `"<qualifier> <base>"` (e.g. `"void"`).
pub fn return_type(func: &BuiltinFunction) -> PineType {
    if func.return_type == "void" {
        PineType::new(Qualifier::Series, BaseType::Void)
    } else {
        PineType::parse(func.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_namespaced_function() {
        assert!(lookup_function("ta.sma").is_some());
        assert!(lookup_function("not.a.real.function").is_none());
    }

    #[test]
    fn resolves_namespaced_variable() {
        let v = lookup_variable("strategy.long").expect("builtin variable");
        assert_eq!(variable_type(v).to_string(), "const string");
    }

    #[test]
    fn plot_return_type_is_void() {
        let f = lookup_function("plot").unwrap();
        assert_eq!(return_type(f).base, BaseType::Void);
    }
}
