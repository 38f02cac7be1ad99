// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Synthesis of the generated half of the marked partial struct.

use crate::backends::csharp::{storage, StorageShape};
use crate::backends::{CancellationToken, Cancelled};

fn indent(s: &str, level: usize) -> String {
    let prefix = "    ".repeat(level);
    s.lines()
        .map(|line| if line.is_empty() { line.to_string() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate the partial struct declaration completing the marked
/// type.
///
/// The declaration carries the packed layout, the element span view
/// over the hidden storage, the truncating constructors, and the copy
/// out helpers. A zero size container keeps the same surface but
/// carries no storage, its span view is the empty span and element
/// access always fails.
pub fn generate_array_struct(
    id: &str,
    shape: &StorageShape,
    token: &CancellationToken,
) -> Result<String, Cancelled> {
    let element = shape.element;
    let storage_name = format!("{}Storage", id);

    let mut members = Vec::new();
    members.push(format!("public const int Length = {};", shape.slot_count));
    members.push(format!("public static readonly Type ElementType = typeof({});", element));

    if shape.slot_count > 0 {
        members.push(format!(
            "[DebuggerBrowsable(DebuggerBrowsableState.Never)]\nprivate {} _storage;",
            storage_name
        ));
    }

    // Oversized inputs are truncated to the container length,
    // undersized inputs leave the remaining slots default filled.
    members.push(format!(
        r#"public {id}(ReadOnlySpan<{element}> source)
{{
    source.Slice(0, Math.Min(source.Length, Length)).CopyTo(Span);
}}"#
    ));
    members.push(format!(
        r#"public {id}(ReadOnlyMemory<{element}> source)
{{
    source.Span.Slice(0, Math.Min(source.Length, Length)).CopyTo(Span);
}}"#
    ));
    members.push(format!(
        r#"public {id}({element}[] source)
{{
    source.AsSpan(0, Math.Min(source.Length, Length)).CopyTo(Span);
}}"#
    ));

    members.push("public int Count => Length;".to_owned());

    if shape.slot_count > 0 {
        members.push(format!(
            "[UnscopedRef]\npublic Span<{element}> Span => MemoryMarshal.Cast<{storage_name}, {element}>(new Span<{storage_name}>(ref _storage));"
        ));
        members
            .push(format!("[UnscopedRef]\npublic ref {element} this[Index idx] => ref Span[idx];"));
        members.push(format!(
            "[UnscopedRef]\npublic Span<{element}>.Enumerator GetEnumerator() => Span.GetEnumerator();"
        ));
    } else {
        members.push(format!("public Span<{element}> Span => Span<{element}>.Empty;"));
        members.push(format!("public ref {element} this[Index idx] => ref Span[idx];"));
        members.push(format!(
            "public Span<{element}>.Enumerator GetEnumerator() => Span.GetEnumerator();"
        ));
    }

    members.push(format!("public {element}[] ToArray() => Span.ToArray();"));

    members.push(format!(
        r#"public void CopyTo({element}[] target, int index)
{{
    Span.CopyTo(target.AsSpan(index));
}}"#
    ));
    members.push(format!(
        r#"public void CopyTo(Span<{element}> target)
{{
    Span.CopyTo(target);
}}"#
    ));
    members.push(format!(
        r#"public void CopyTo(Memory<{element}> target)
{{
    Span.CopyTo(target.Span);
}}"#
    ));

    if shape.slot_count > 0 {
        members.push(storage::generate_storage_struct(shape, &storage_name, token)?);
    }

    let mut code = String::new();
    code.push_str("[StructLayout(LayoutKind.Sequential, Pack = 1)]\n");
    code.push_str("[DebuggerDisplay(\"Type of element = {ElementType}; Length = {Length}\")]\n");
    code.push_str(&format!("partial struct {}\n", id));
    code.push_str("{\n");
    code.push_str(&indent(&members.join("\n\n"), 1));
    code.push_str("\n}");
    Ok(code)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::assert_contains;

    #[test]
    fn test_sized_surface() {
        let shape = StorageShape { element: "byte", slot_count: 2 };
        let code = generate_array_struct("Row", &shape, &CancellationToken::new()).unwrap();
        assert_contains(&code, "partial struct Row\n{");
        assert_contains(&code, "    public const int Length = 2;");
        assert_contains(&code, "    [DebuggerBrowsable(DebuggerBrowsableState.Never)]\n    private RowStorage _storage;");
        assert_contains(&code, "    public Row(ReadOnlySpan<byte> source)");
        assert_contains(&code, "source.Slice(0, Math.Min(source.Length, Length)).CopyTo(Span);");
        assert_contains(
            &code,
            "    [UnscopedRef]\n    public Span<byte> Span => MemoryMarshal.Cast<RowStorage, byte>(new Span<RowStorage>(ref _storage));"
        );
        assert_contains(&code, "    public ref byte this[Index idx] => ref Span[idx];");
        assert_contains(&code, "    private struct RowStorage");
        assert_contains(&code, "        public byte __t0000, __t0001;");
    }

    #[test]
    fn test_copy_out_overloads() {
        // Callers hold arrays, spans over stack buffers, or memory
        // handles; each form gets its own overload.
        let shape = StorageShape { element: "byte", slot_count: 4 };
        let code = generate_array_struct("Row", &shape, &CancellationToken::new()).unwrap();
        assert_contains(&code, "public void CopyTo(byte[] target, int index)");
        assert_contains(&code, "public void CopyTo(Span<byte> target)");
        assert_contains(&code, "public void CopyTo(Memory<byte> target)");
        assert!(!code.contains("public void CopyTo(byte[] target)\n"));
    }

    #[test]
    fn test_degenerate_surface() {
        let shape = StorageShape { element: "char", slot_count: 0 };
        let code = generate_array_struct("Empty", &shape, &CancellationToken::new()).unwrap();
        assert_contains(&code, "    public const int Length = 0;");
        assert_contains(&code, "    public Span<char> Span => Span<char>.Empty;");
        assert_contains(&code, "    public ref char this[Index idx] => ref Span[idx];");
        assert!(!code.contains("_storage"));
        assert!(!code.contains("[UnscopedRef]"));
        assert!(!code.contains("struct EmptyStorage"));
    }

    #[test]
    fn test_cancellation_reaches_storage_slots() {
        let token = CancellationToken::new();
        token.cancel();
        let shape = StorageShape { element: "byte", slot_count: 8 };
        assert_eq!(generate_array_struct("Row", &shape, &token), Err(Cancelled));
    }
}
