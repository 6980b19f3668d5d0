use super::*;
use crate::mat::{
    CellArray, CharArray, FunctionHandle, Matrix, NumericClass, OpaqueObject, SparseArray,
};
use serde_json::json;

fn scalar_struct(fields: Vec<(&str, ArrayNode)>) -> ArrayNode {
    StructArray::scalar(fields).into()
}

/// Render `node` as field `v` of a scalar struct and return that field
fn field_value(node: ArrayNode) -> Value {
    let entry = ArrayEntry::new("s", scalar_struct(vec![("v", node)]));
    Converter::new().to_value(&[entry])[0]["s"]["v"].clone()
}

#[test]
fn test_scalar_real_field() {
    let entry = ArrayEntry::new("data", scalar_struct(vec![("x", Matrix::scalar(3.5).into())]));
    let text = convert(&[entry]);
    assert_eq!(text, r#"[{"data":{"type":"1x1 struct","x":3.5}}]"#);
}

#[test]
fn test_complex_scalar_keeps_only_imaginary_part() {
    assert_eq!(field_value(Matrix::complex_scalar(1.0, 2.0).into()), json!("+2.0j"));
    assert_eq!(field_value(Matrix::complex_scalar(5.0, -0.5).into()), json!("+-0.5j"));
}

#[test]
fn test_complex_scalar_uses_jvm_exponent_form() {
    assert_eq!(field_value(Matrix::complex_scalar(0.0, 1e7).into()), json!("+1.0E7j"));
    assert_eq!(field_value(Matrix::complex_scalar(0.0, 1e-7).into()), json!("+1.0E-7j"));
    assert_eq!(field_value(Matrix::complex_scalar(0.0, 9999999.5).into()), json!("+9999999.5j"));
}

#[test]
fn test_jvm_double() {
    assert_eq!(jvm_double(2.0), "2.0");
    assert_eq!(jvm_double(0.0), "0.0");
    assert_eq!(jvm_double(0.001), "0.001");
    assert_eq!(jvm_double(0.0001), "1.0E-4");
    assert_eq!(jvm_double(-2.5e12), "-2.5E12");
    assert_eq!(jvm_double(1.25e-10), "1.25E-10");
    assert_eq!(jvm_double(f64::NAN), "NaN");
    assert_eq!(jvm_double(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn test_single_element_sparse_is_scalar() {
    assert_eq!(field_value(SparseArray::scalar(5.0).into()), json!(5.0));

    let logical = SparseArray {
        is_logical: true,
        ..SparseArray::scalar(1.0)
    };
    assert_eq!(field_value(logical.into()), json!(true));

    let complex = SparseArray {
        imag: Some(vec![3.0]),
        ..SparseArray::scalar(1.0)
    };
    assert_eq!(field_value(complex.into()), json!("+3.0j"));

    // No stored value means zero
    let zero = SparseArray {
        dims: vec![1, 1],
        column_starts: vec![0, 0],
        ..Default::default()
    };
    let node: ArrayNode = zero.into();
    assert_eq!(Rule::classify(&node, true), Some(Rule::ScalarMatrix));
    assert_eq!(field_value(node), json!(0.0));
}

#[test]
fn test_logical_scalar_is_boolean() {
    assert_eq!(field_value(Matrix::logical_scalar(true).into()), json!(true));
    assert_eq!(field_value(Matrix::logical_scalar(false).into()), json!(false));
}

#[test]
fn test_integer_scalar_is_number() {
    let value = field_value(Matrix::scalar(42.0).with_class(NumericClass::Int32).into());
    assert_eq!(value, json!(42.0));
}

#[test]
fn test_non_finite_scalars() {
    assert_eq!(field_value(Matrix::scalar(f64::NAN).into()), json!("NaN"));
    assert_eq!(field_value(Matrix::scalar(f64::INFINITY).into()), json!("Inf"));
    assert_eq!(field_value(Matrix::scalar(f64::NEG_INFINITY).into()), json!("-Inf"));
}

#[test]
fn test_empty_fields() {
    let empty_cell = CellArray {
        dims: vec![0, 0],
        elements: vec![],
    };
    let empty_char = CharArray {
        dims: vec![0, 0],
        text: String::new(),
    };
    assert_eq!(field_value(empty_cell.into()), json!({}));
    assert_eq!(field_value(Matrix::empty().into()), json!([]));
    assert_eq!(field_value(empty_char.into()), json!(""));
    assert_eq!(
        field_value(
            SparseArray {
                dims: vec![0, 3],
                ..Default::default()
            }
            .into()
        ),
        json!([])
    );
}

#[test]
fn test_scalar_struct_lists_fields_as_siblings() {
    let entry = ArrayEntry::new(
        "s",
        scalar_struct(vec![
            ("a", Matrix::scalar(1.0).into()),
            ("b", CharArray::row("hi").into()),
        ]),
    );
    let text = convert(&[entry]);
    assert_eq!(text, r#"[{"s":{"type":"1x1 struct","a":1.0,"b":"hi"}}]"#);
}

#[test]
fn test_struct_array_shows_only_type() {
    let array = StructArray {
        dims: vec![1, 3],
        class: None,
        field_names: vec!["a".into()],
        values: vec![
            Matrix::scalar(1.0).into(),
            Matrix::scalar(2.0).into(),
            Matrix::scalar(3.0).into(),
        ],
    };
    let value = Converter::new().to_value(&[ArrayEntry::new("s", array.into())]);
    assert_eq!(value, json!([{"s": {"type": "1x3 struct"}}]));
}

#[test]
fn test_nested_struct_field() {
    let inner = scalar_struct(vec![("depth", Matrix::scalar(2.0).into())]);
    let outer = scalar_struct(vec![("inner", inner)]);
    let value = Converter::new().to_value(&[ArrayEntry::new("outer", outer)]);
    assert_eq!(
        value,
        json!([{"outer": {
            "type": "1x1 struct",
            "inner": {"type": "1x1 struct", "depth": 2.0}
        }}])
    );
}

#[test]
fn test_object_struct_type_line() {
    let packaged = StructArray::scalar(vec![("id", ArrayNode::from(Matrix::scalar(1.0)))])
        .with_class("sensors.Probe");
    let plain = StructArray::scalar(Vec::<(&str, ArrayNode)>::new()).with_class("Probe");

    assert_eq!(
        field_value(packaged.into()),
        json!({"type": "1x1 sensors.Probe", "id": 1.0})
    );
    assert_eq!(field_value(plain.into()), json!({"type": "1x1 Probe"}));
}

#[test]
fn test_generic_fallback() {
    let matrix = Matrix::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(field_value(matrix.into()), json!("2x2 double"));

    let multi_row = CharArray {
        dims: vec![2, 3],
        text: "abcdef".into(),
    };
    assert_eq!(field_value(multi_row.into()), json!("2x3 char"));

    let cell = CellArray {
        dims: vec![1, 2],
        elements: vec![Matrix::scalar(1.0).into(), Matrix::scalar(2.0).into()],
    };
    assert_eq!(field_value(cell.into()), json!("1x2 cell"));

    let logical = Matrix {
        dims: vec![1, 2],
        class: NumericClass::UInt8,
        is_logical: true,
        real: vec![1.0, 0.0],
        imag: None,
    };
    assert_eq!(field_value(logical.into()), json!("1x2 logical"));

    let sparse = SparseArray {
        dims: vec![100, 100],
        row_indices: vec![4, 17],
        column_starts: vec![0; 101],
        real: vec![1.0, 2.0],
        ..Default::default()
    };
    assert_eq!(field_value(sparse.into()), json!("100x100 sparse"));

    let three_d = Matrix::new(vec![2, 1, 3], vec![0.0; 6]).with_class(NumericClass::Single);
    assert_eq!(field_value(three_d.into()), json!("2x1x3 single"));
}

#[test]
fn test_function_handle() {
    let handle = FunctionHandle {
        dims: vec![1, 1],
        content: Box::new(scalar_struct(vec![("function", CharArray::row("sin").into())])),
    };
    assert_eq!(
        field_value(handle.into()),
        json!({
            "function_handle": "1x1",
            "content": {"type": "1x1 struct", "function": "sin"}
        })
    );
}

#[test]
fn test_foreign_object_uses_configured_tag() {
    let object = OpaqueObject {
        dims: vec![1, 1],
        type_system: "java".into(),
        class_name: "java.io.File".into(),
    };
    let entry = ArrayEntry::new("s", scalar_struct(vec![("f", object.into())]));

    let default = Converter::new().to_value(std::slice::from_ref(&entry));
    assert_eq!(default[0]["s"]["f"], json!("1x1 java.io.File (Java)"));

    let custom = Converter::with_options(RenderOptions {
        foreign_tag: "JVM".into(),
        ..Default::default()
    })
    .to_value(&[entry]);
    assert_eq!(custom[0]["s"]["f"], json!("1x1 java.io.File (JVM)"));
}

#[test]
fn test_top_level_without_field_context() {
    let entries = vec![
        ArrayEntry::new("x", Matrix::scalar(3.5).into()),
        ArrayEntry::new("name", CharArray::row("abc").into()),
        ArrayEntry::new("m", Matrix::new(vec![2, 2], vec![0.0; 4]).into()),
        ArrayEntry::new("s", scalar_struct(vec![("a", Matrix::scalar(1.0).into())])),
    ];
    let value = Converter::new().to_value(&entries);
    assert_eq!(
        value,
        json!([
            {"x": {}},
            {"name": {}},
            {"m": {}},
            {"s": {"type": "1x1 struct", "a": 1.0}}
        ])
    );
}

#[test]
fn test_empty_variable_name_key() {
    let entry = ArrayEntry::new("", scalar_struct(vec![]));
    let text = convert(&[entry]);
    assert_eq!(text, r#"[{"\"\"":{"type":"1x1 struct"}}]"#);
}

#[test]
fn test_entries_keep_file_order() {
    let entries: Vec<_> = ["zeta", "alpha", "mid"]
        .iter()
        .map(|name| ArrayEntry::new(*name, scalar_struct(vec![])))
        .collect();
    let value = Converter::new().to_value(&entries);
    let keys: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_object().unwrap().keys().next().unwrap().clone())
        .collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_pretty_output() {
    let entry = ArrayEntry::new("s", scalar_struct(vec![("a", Matrix::scalar(1.0).into())]));
    let converter = Converter::with_options(RenderOptions {
        pretty: true,
        ..Default::default()
    });
    let text = converter.convert(&[entry]);
    assert!(text.contains('\n'));
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!([{"s": {"type": "1x1 struct", "a": 1.0}}])
    );
}

// Precedence boundaries: swapping adjacent rules would change these outputs.

#[test]
fn test_precedence_empty_before_row_string() {
    // 1x0 char has one row but no characters
    let node: ArrayNode = CharArray {
        dims: vec![1, 0],
        text: String::new(),
    }
    .into();
    assert_eq!(Rule::classify(&node, true), Some(Rule::Empty));
    assert!(Rule::RowString.matches(&node, true));
}

#[test]
fn test_precedence_empty_matrix_vs_empty_char() {
    let matrix: ArrayNode = Matrix::new(vec![1, 0], vec![]).into();
    let chars: ArrayNode = CharArray {
        dims: vec![1, 0],
        text: String::new(),
    }
    .into();
    assert_eq!(field_value(matrix), json!([]));
    assert_eq!(field_value(chars), json!(""));
}

#[test]
fn test_precedence_row_string_before_scalar() {
    let node: ArrayNode = CharArray::row("a").into();
    assert_eq!(node.num_elements(), 1);
    assert_eq!(Rule::classify(&node, true), Some(Rule::RowString));
    assert_eq!(field_value(node), json!("a"));
}

#[test]
fn test_precedence_scalar_before_fallback() {
    let node: ArrayNode = Matrix::scalar(7.0).into();
    assert_eq!(Rule::classify(&node, true), Some(Rule::ScalarMatrix));
    assert!(Rule::Fallback.matches(&node, true));
}

#[test]
fn test_empty_struct_is_not_short_circuited() {
    let node: ArrayNode = StructArray {
        dims: vec![0, 0],
        class: None,
        field_names: vec!["a".into()],
        values: vec![],
    }
    .into();
    assert_eq!(Rule::classify(&node, true), Some(Rule::Struct));
    assert_eq!(field_value(node), json!({"type": "0x0 struct"}));
}

#[test]
fn test_no_rule_outside_field_for_plain_values() {
    let node: ArrayNode = Matrix::scalar(1.0).into();
    assert_eq!(Converter::new().classify(&node, false), None);
    assert_eq!(Converter::new().classify(&node, true), Some(Rule::ScalarMatrix));
    let opaque: ArrayNode = OpaqueObject::default().into();
    assert_eq!(Rule::classify(&opaque, false), None);
}

#[test]
fn test_dim_string() {
    assert_eq!(dim_string(&[2, 3]), "2x3");
    assert_eq!(dim_string(&[1, 1, 4]), "1x1x4");
    assert_eq!(Rule::ScalarMatrix.to_string(), "scalar-matrix");
}
