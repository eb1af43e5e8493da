//! Source-type to C++-type mapping.
//!
//! Each source type maps to exactly one target type. Integer and float
//! widths map by exact size, `string` maps to the owned `std::string`,
//! generic containers map to their `mana::` runtime equivalents, and
//! `dyn Trait` maps to an owned interface-object handle.

use manac_sem::types::split_type_list;

/// Maps a mana type name to its C++ spelling.
pub fn map_type(mana_type: &str) -> String {
    let mana_type = mana_type.trim();
    match mana_type {
        "" | "void" => return "void".into(),
        "i8" => return "int8_t".into(),
        "i16" => return "int16_t".into(),
        "i32" => return "int32_t".into(),
        "i64" | "int" => return "int64_t".into(),
        "u8" => return "uint8_t".into(),
        "u16" => return "uint16_t".into(),
        "u32" => return "uint32_t".into(),
        "u64" => return "uint64_t".into(),
        "f32" => return "float".into(),
        "f64" | "float" => return "double".into(),
        "bool" => return "bool".into(),
        "string" | "String" | "str" => return "std::string".into(),
        "char" => return "char".into(),
        _ => {}
    }

    // Box<dyn Trait> and dyn Trait become owned interface handles;
    // &dyn Trait a raw interface pointer.
    if let Some(trait_name) = mana_type
        .strip_prefix("Box<dyn ")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return format!("std::unique_ptr<I{}>", trait_name);
    }
    if let Some(trait_name) = mana_type.strip_prefix("&dyn ") {
        return format!("I{}*", trait_name);
    }
    if let Some(trait_name) = mana_type.strip_prefix("dyn ") {
        return format!("std::unique_ptr<I{}>", trait_name);
    }

    // References and pointers.
    if let Some(rest) = mana_type.strip_prefix("&mut ") {
        return format!("{}&", map_type(rest));
    }
    if let Some(rest) = mana_type.strip_prefix('&') {
        return format!("const {}&", map_type(rest));
    }
    if let Some(rest) = mana_type.strip_prefix('*') {
        return format!("{}*", map_type(rest));
    }

    // Generic containers: Result/Option/Vec/HashMap live in the runtime.
    if let Some(angle) = mana_type.find('<') {
        if mana_type.ends_with('>') {
            let base = &mana_type[..angle];
            let inner = &mana_type[angle + 1..mana_type.len() - 1];
            let mapped_inner = split_type_list(inner)
                .iter()
                .map(|part| map_type(part))
                .collect::<Vec<_>>()
                .join(", ");
            if matches!(base, "Result" | "Option" | "Vec" | "HashMap") {
                return format!("mana::{}<{}>", base, mapped_inner);
            }
            return format!("{}<{}>", base, mapped_inner);
        }
    }

    // Fixed arrays: [N]T becomes std::array, []T the runtime Vec.
    if let Some(rest) = mana_type.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            let size = &rest[..close];
            let elem = map_type(&rest[close + 1..]);
            if size.is_empty() {
                return format!("mana::Vec<{}>", elem);
            }
            return format!("std::array<{}, {}>", elem, size);
        }
    }

    // Tuples.
    if mana_type.starts_with('(') && mana_type.ends_with(')') {
        let inner = &mana_type[1..mana_type.len() - 1];
        let mapped = split_type_list(inner)
            .iter()
            .map(|part| map_type(part))
            .collect::<Vec<_>>()
            .join(", ");
        return format!("std::tuple<{}>", mapped);
    }

    mana_type.to_string()
}

/// Escapes a string payload for a C++ string or char literal.
pub fn escape_cpp_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}
