//! Purpose: Re-indent compact JSON text without re-parsing it into values.
//! Exports: `indent`.
//! Role: Backs `marshal_indent` and indented stream encoding for every engine.
//! Invariants: String contents (including escaped quotes) pass through untouched.
//! Invariants: Empty `{}`/`[]` stay compact; `prefix` starts every line after the first.

/// Re-indents `src`, dropping insignificant whitespace outside strings.
pub fn indent(src: &[u8], prefix: &str, indent: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < src.len() {
        let b = src[i];
        i += 1;

        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                let close = if b == b'{' { b'}' } else { b']' };
                let next = src[i..].iter().position(|c| !c.is_ascii_whitespace());
                if next.map(|skip| src[i + skip]) == Some(close) {
                    out.push(close);
                    i += next.unwrap_or(0) + 1;
                    continue;
                }
                depth += 1;
                newline(&mut out, prefix, indent, depth);
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, prefix, indent, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, prefix, indent, depth);
            }
            b':' => out.extend_from_slice(b": "),
            b' ' | b'\t' | b'\n' | b'\r' => {}
            _ => out.push(b),
        }
    }
    out
}

fn newline(out: &mut Vec<u8>, prefix: &str, indent: &str, depth: usize) {
    out.push(b'\n');
    out.extend_from_slice(prefix.as_bytes());
    for _ in 0..depth {
        out.extend_from_slice(indent.as_bytes());
    }
}
