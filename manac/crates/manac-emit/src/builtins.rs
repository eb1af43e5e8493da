//! Built-in call dispatch.
//!
//! A fixed mapping rewrites recognizable bare-name calls into
//! runtime-namespaced (`mana::`) or standard-library (`std::`) calls.
//! A dedicated set of string-method names routes method calls on
//! non-`Vec` receivers through the global runtime helpers, since the
//! target's `std::string` does not carry these methods.

/// Maps a bare callee name to its emitted spelling, when the name is a
/// recognized builtin. Names not in the table emit unchanged.
pub fn map_builtin_call(name: &str) -> Option<&'static str> {
    let mapped = match name {
        "println" => "mana::println",
        "print" => "mana::print",
        "format" => "mana::format",
        "Some" | "some" => "mana::Some",
        "Ok" | "ok" => "mana::Ok",
        "Err" | "err" => "mana::Err",
        "assert" | "assert_true" => "mana::assert_true",
        "assert_false" => "mana::assert_false",
        "assert_eq" => "mana::assert_eq",
        "assert_ne" => "mana::assert_ne",
        "assert_msg" => "mana::assert_msg",
        "assert_some" => "mana::assert_some",
        "assert_none" => "mana::assert_none",
        "assert_ok" => "mana::assert_ok",
        "assert_err" => "mana::assert_err",
        "assert_contains" => "mana::assert_contains",
        "assert_empty" => "mana::assert_empty",
        "assert_len" => "mana::assert_len",
        "assert_str_eq" => "mana::assert_str_eq",
        "assert_gt" => "mana::assert_gt",
        "assert_lt" => "mana::assert_lt",
        "assert_ge" => "mana::assert_ge",
        "assert_le" => "mana::assert_le",
        "assert_approx" => "mana::assert_approx",

        // File and path helpers.
        "read_file" => "mana::read_file",
        "write_file" => "mana::write_file",
        "append_file" => "mana::append_file",
        "file_exists" => "mana::file_exists",
        "delete_file" => "mana::delete_file",
        "read_lines" => "mana::read_lines",
        "path_join" => "mana::path_join",
        "path_parent" => "mana::path_parent",
        "path_filename" => "mana::path_filename",
        "path_extension" => "mana::path_extension",
        "is_directory" => "mana::is_directory",
        "cwd" => "mana::cwd",
        "env_get" => "mana::env_get",

        // Time and random helpers.
        "time_now_ms" => "mana::time_now_ms",
        "time_now_secs" => "mana::time_now_secs",
        "sleep_ms" => "mana::sleep_ms",
        "random_int" => "mana::random_int",

        // Vector utilities.
        "vec_sort" => "mana::vec_sort",
        "vec_reverse" => "mana::vec_reverse",
        "vec_contains" => "mana::vec_contains",
        "first" => "mana::first",
        "last" => "mana::last",
        "concat" => "mana::concat",
        "flatten" => "mana::flatten",
        "zip" => "mana::zip",
        "unzip" => "mana::unzip",
        "repeat" => "mana::repeat",

        // String helpers.
        "len" => "mana::len",
        "is_empty" => "mana::is_empty",
        "to_string" => "mana::to_string",
        "trim" => "mana::trim",
        "split" => "mana::split",
        "join" => "mana::join",
        "starts_with" => "mana::starts_with",
        "ends_with" => "mana::ends_with",
        "contains" => "mana::contains",
        "replace" => "mana::replace",
        "to_uppercase" => "mana::to_uppercase",
        "to_lowercase" => "mana::to_lowercase",
        "substr" => "mana::substr",
        "reverse" => "mana::reverse",
        "read_line" => "mana::read_line",
        "parse_int" => "mana::parse_int",
        "parse_float" => "mana::parse_float",

        // Math: generic helpers stay in the runtime, the rest forwards to
        // the target's math library.
        "min" => "mana::min",
        "max" => "mana::max",
        "clamp" => "mana::clamp",
        "abs" => "std::abs",
        "sqrt" => "std::sqrt",
        "pow" => "std::pow",
        "sin" => "std::sin",
        "cos" => "std::cos",
        "tan" => "std::tan",
        "asin" => "std::asin",
        "acos" => "std::acos",
        "atan" => "std::atan",
        "atan2" => "std::atan2",
        "floor" => "std::floor",
        "ceil" => "std::ceil",
        "round" => "std::round",
        "trunc" => "std::trunc",
        "log" => "std::log",
        "log10" => "std::log10",
        "log2" => "std::log2",
        "exp" => "std::exp",

        _ => return None,
    };
    Some(mapped)
}

/// Method names that emit as global `mana::` calls when the receiver is
/// not a `Vec`.
pub fn is_string_method(name: &str) -> bool {
    matches!(
        name,
        "starts_with"
            | "ends_with"
            | "contains"
            | "trim"
            | "substr"
            | "replace"
            | "to_uppercase"
            | "to_lowercase"
            | "split"
            | "repeat"
            | "reverse"
            | "join"
    )
}
