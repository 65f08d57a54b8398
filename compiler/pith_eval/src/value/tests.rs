use pretty_assertions::assert_eq;

use super::*;
use crate::errors::ExcType;

fn n(v: f64) -> Value {
    Value::Number(v)
}

fn nums(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::Number).collect()
}

fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> ItemKey {
    ItemKey::Slice(SliceBounds { start, stop, step })
}

// Truthiness and formatting

#[test]
fn truthiness() {
    assert!(!n(0.0).is_truthy());
    assert!(n(-1.0).is_truthy());
    assert!(!Value::string("").is_truthy());
    assert!(!Value::None.is_truthy());
    assert!(!Value::list(vec![]).is_truthy());
    assert!(Value::tuple(vec![Value::None]).is_truthy());
    assert!(!Value::Mapping(MappingValue::new()).is_truthy());
}

#[test]
fn display_forms() {
    assert_eq!(n(3.0).to_string(), "3");
    assert_eq!(n(2.5).to_string(), "2.5");
    assert_eq!(n(f64::INFINITY).to_string(), "inf");
    assert_eq!(Value::Bool(true).to_string(), "True");
    assert_eq!(Value::tuple(nums(&[1.0])).to_string(), "(1,)");
    assert_eq!(
        Value::list(vec![Value::string("a"), n(1.0)]).to_string(),
        "['a', 1]"
    );
    assert_eq!(Value::string("it's").repr(), "'it\\'s'");
}

#[test]
fn mapping_display_keeps_insertion_order() {
    let map = MappingValue::new();
    map.insert(MapKey::Str(Rc::from("b")), n(1.0));
    map.insert(MapKey::Number(key::normalized_bits(1.0)), n(2.0));
    assert_eq!(Value::Mapping(map).to_string(), "{'b': 1, 1: 2}");
}

/// `[first, <itself>]`
fn self_containing_list(first: f64) -> Value {
    let value = Value::list(vec![n(first)]);
    let Value::Sequence(seq) = &value else {
        panic!("expected a list");
    };
    seq.extend(vec![value.clone()]);
    value
}

#[test]
fn self_containing_containers_display_an_ellipsis() {
    let list = self_containing_list(1.0);
    assert_eq!(list.to_string(), "[1, [...]]");
    assert_eq!(format!("{list:?}"), "[1, [...]]");

    let map = MappingValue::new();
    map.insert(MapKey::Str(Rc::from("k")), Value::Mapping(map.clone()));
    assert_eq!(Value::Mapping(map).to_string(), "{'k': {...}}");
}

#[test]
fn cycle_through_a_tuple_displays_the_reentered_list() {
    let list = Value::list(vec![]);
    let Value::Sequence(seq) = &list else {
        panic!("expected a list");
    };
    seq.extend(vec![Value::tuple(vec![list.clone()])]);
    assert_eq!(list.to_string(), "[([...],)]");
    // Rendering twice gives the same text once the first walk is done.
    assert_eq!(list.to_string(), "[([...],)]");
}

// Equality and hashing

#[test]
fn variants_never_compare_equal() {
    assert_ne!(n(1.0), Value::Bool(true));
    assert_ne!(n(0.0), Value::None);
    assert_ne!(Value::list(vec![]), Value::tuple(vec![]));
}

#[test]
fn containers_compare_deeply() {
    let a = Value::list(vec![n(1.0), Value::tuple(nums(&[2.0, 3.0]))]);
    let b = Value::list(vec![n(1.0), Value::tuple(nums(&[2.0, 3.0]))]);
    assert_eq!(a, b);
    assert!(!a.is(&b));
    assert!(a.is(&a.clone()));
}

#[test]
fn self_containing_lists_compare_without_overflowing() {
    let a = self_containing_list(1.0);
    let b = self_containing_list(1.0);
    let c = self_containing_list(2.0);
    assert!(a.equals(&a));
    assert!(a.equals(&b));
    assert!(!a.equals(&c));
}

#[test]
fn equal_values_hash_equally() {
    assert_eq!(n(0.0).hash_value().ok(), n(-0.0).hash_value().ok());
    assert_eq!(
        Value::tuple(nums(&[1.0, 2.0])).hash_value().ok(),
        Value::tuple(nums(&[1.0, 2.0])).hash_value().ok()
    );
}

#[test]
fn lists_and_mappings_are_unhashable() {
    let err = Value::list(vec![]).hash_value().unwrap_err();
    assert_eq!(err.kind, ExcType::TypeError);
    assert_eq!(err.message, "unhashable type: 'list'");
    assert!(Value::Mapping(MappingValue::new()).hash_value().is_err());
    assert!(Value::tuple(vec![Value::list(vec![])]).hash_value().is_err());
}

// Indexing

#[test]
fn negative_index_counts_from_end() {
    let list = Value::list(nums(&[1.0, 2.0, 3.0]));
    assert_eq!(list.get_item(&ItemKey::Value(n(-1.0))).ok(), Some(n(3.0)));
}

#[test]
fn index_out_of_range_is_index_error() {
    let list = Value::list(nums(&[1.0]));
    let err = list.get_item(&ItemKey::Value(n(5.0))).unwrap_err();
    assert_eq!(err.kind, ExcType::IndexError);
    assert_eq!(err.message, "list index out of range");
}

#[test]
fn non_integer_index_is_type_error() {
    let list = Value::list(nums(&[1.0]));
    let err = list.get_item(&ItemKey::Value(n(0.5))).unwrap_err();
    assert_eq!(err.kind, ExcType::TypeError);
}

#[test]
fn slices_follow_clamping_rules() {
    let list = Value::list(nums(&[0.0, 1.0, 2.0, 3.0, 4.0]));
    let get = |key: ItemKey| list.get_item(&key).ok();
    assert_eq!(get(slice(Some(1), Some(3), None)), Some(Value::list(nums(&[1.0, 2.0]))));
    assert_eq!(get(slice(Some(-2), None, None)), Some(Value::list(nums(&[3.0, 4.0]))));
    assert_eq!(get(slice(None, Some(100), Some(2))), Some(Value::list(nums(&[0.0, 2.0, 4.0]))));
    assert_eq!(
        get(slice(None, None, Some(-1))),
        Some(Value::list(nums(&[4.0, 3.0, 2.0, 1.0, 0.0])))
    );
    assert_eq!(get(slice(Some(3), Some(1), None)), Some(Value::list(vec![])));
}

#[test]
fn steps_past_the_integer_range_stop_after_one_position() {
    let list = Value::list(nums(&[1.0, 2.0, 3.0]));
    let get = |key: ItemKey| list.get_item(&key).ok();
    assert_eq!(get(slice(Some(1), None, Some(i64::MAX))), Some(Value::list(nums(&[2.0]))));
    assert_eq!(get(slice(None, None, Some(i64::MIN))), Some(Value::list(nums(&[3.0]))));
    assert_eq!(
        get(slice(Some(i64::MIN), Some(i64::MAX), Some(i64::MAX))),
        Some(Value::list(nums(&[1.0])))
    );
    assert_eq!(
        get(slice(Some(i64::MAX), Some(i64::MIN), Some(-1))),
        Some(Value::list(nums(&[3.0, 2.0, 1.0])))
    );

    let bounds = SliceBounds { start: Some(i64::MAX), stop: None, step: Some(i64::MIN) };
    assert_eq!(bounds.positions(3).ok(), Some(vec![2]));
    assert_eq!(
        Value::string("abc").get_item(&slice(Some(1), None, Some(i64::MAX))).ok(),
        Some(Value::string("b"))
    );
}

#[test]
fn extended_slice_assignment_with_a_huge_step() {
    let list = Value::list(nums(&[1.0, 2.0, 3.0]));
    list.set_item(&slice(Some(1), None, Some(i64::MAX)), Value::list(nums(&[9.0])))
        .ok();
    assert_eq!(list, Value::list(nums(&[1.0, 9.0, 3.0])));

    list.set_item(&slice(None, None, Some(i64::MIN)), Value::list(nums(&[7.0])))
        .ok();
    assert_eq!(list, Value::list(nums(&[1.0, 9.0, 7.0])));
}

#[test]
fn zero_step_is_value_error() {
    let list = Value::list(nums(&[1.0]));
    let err = list.get_item(&slice(None, None, Some(0))).unwrap_err();
    assert_eq!(err.kind, ExcType::ValueError);
}

#[test]
fn slice_assignment_splices() {
    let list = Value::list(nums(&[0.0, 1.0, 2.0, 3.0]));
    list.set_item(&slice(Some(1), Some(3), None), Value::list(nums(&[9.0])))
        .ok();
    assert_eq!(list, Value::list(nums(&[0.0, 9.0, 3.0])));
}

#[test]
fn extended_slice_assignment_requires_matching_size() {
    let list = Value::list(nums(&[0.0, 1.0, 2.0, 3.0]));
    let err = list
        .set_item(&slice(None, None, Some(2)), Value::list(nums(&[7.0])))
        .unwrap_err();
    assert_eq!(err.kind, ExcType::ValueError);

    list.set_item(&slice(None, None, Some(2)), Value::list(nums(&[7.0, 8.0])))
        .ok();
    assert_eq!(list, Value::list(nums(&[7.0, 1.0, 8.0, 3.0])));
}

#[test]
fn tuples_reject_item_assignment() {
    let tuple = Value::tuple(nums(&[1.0]));
    let err = tuple.set_item(&ItemKey::Value(n(0.0)), n(2.0)).unwrap_err();
    assert_eq!(err.kind, ExcType::TypeError);
}

#[test]
fn strings_index_by_character() {
    let s = Value::string("héllo");
    assert_eq!(s.get_item(&ItemKey::Value(n(1.0))).ok(), Some(Value::string("é")));
    assert_eq!(
        s.get_item(&slice(Some(1), Some(3), None)).ok(),
        Some(Value::string("él"))
    );
}

#[test]
fn missing_mapping_key_is_key_error() {
    let map = Value::Mapping(MappingValue::new());
    let err = map.get_item(&ItemKey::Value(Value::string("k"))).unwrap_err();
    assert_eq!(err.kind, ExcType::KeyError);
    assert_eq!(err.message, "'k'");
}

#[test]
fn numbers_normalize_as_mapping_keys() {
    let map = Value::Mapping(MappingValue::new());
    map.set_item(&ItemKey::Value(n(0.0)), Value::string("zero")).ok();
    assert_eq!(
        map.get_item(&ItemKey::Value(n(-0.0))).ok(),
        Some(Value::string("zero"))
    );
}

#[test]
fn containers_alias_on_clone() {
    let list = Value::list(vec![]);
    let alias = list.clone();
    let Value::Sequence(seq) = &alias else {
        panic!("expected a sequence");
    };
    seq.extend(nums(&[1.0]));
    assert_eq!(list, Value::list(nums(&[1.0])));
}

// Members

#[test]
fn scalars_have_no_members() {
    let err = n(1.0).get_member("x").unwrap_err();
    assert_eq!(err.kind, ExcType::TypeError);
    assert!(n(1.0).set_member("x", Value::None).is_err());
}

#[test]
fn list_methods_are_bound() {
    let list = Value::list(vec![]);
    let Ok(Value::Function(append)) = list.get_member("append") else {
        panic!("expected a bound method");
    };
    assert!(append.receiver().is_some_and(|r| r.is(&list)));
}

#[test]
fn tuples_only_expose_read_methods() {
    let tuple = Value::tuple(vec![]);
    assert!(tuple.get_member("count").is_ok());
    let err = tuple.get_member("append").unwrap_err();
    assert_eq!(err.kind, ExcType::AttributeError);
}

#[test]
fn sequence_methods_mutate_in_place() {
    let seq = SequenceValue::list(nums(&[3.0, 1.0]));
    seq.call_method(SequenceMethod::Append, vec![n(2.0)]).ok();
    seq.call_method(SequenceMethod::Reverse, vec![]).ok();
    assert_eq!(seq.to_vec(), nums(&[2.0, 1.0, 3.0]));
    assert_eq!(seq.call_method(SequenceMethod::Pop, vec![]).ok(), Some(n(3.0)));
    assert_eq!(
        seq.call_method(SequenceMethod::Index, vec![n(1.0)]).ok(),
        Some(n(1.0))
    );
    let err = seq
        .call_method(SequenceMethod::Remove, vec![n(7.0)])
        .unwrap_err();
    assert_eq!(err.kind, ExcType::ValueError);
}

#[test]
fn mapping_methods() {
    let map = MappingValue::new();
    map.insert(MapKey::Str(Rc::from("a")), n(1.0));
    assert_eq!(
        map.call_method(MappingMethod::Get, vec![Value::string("z"), n(0.0)])
            .ok(),
        Some(n(0.0))
    );
    assert_eq!(
        map.call_method(MappingMethod::Pop, vec![Value::string("a")]).ok(),
        Some(n(1.0))
    );
    assert!(map.is_empty());
}

#[test]
fn object_attributes_shadow_class_members() {
    let mut members = Members::default();
    members.insert(Rc::from("v"), n(1.0));
    let class = ClassValue::new(Rc::from("C"), members, vec![]);
    let object = Value::Object(ClassValue::create_object(&class));
    assert_eq!(object.get_member("v").ok(), Some(n(1.0)));

    object.set_member("v", n(2.0)).ok();
    assert_eq!(object.get_member("v").ok(), Some(n(2.0)));
    assert_eq!(class.lookup("v"), Some(n(1.0)));
}

#[test]
fn class_lookup_is_leftmost_depth_first() {
    let member = |v: f64| {
        let mut members = Members::default();
        members.insert(Rc::from("m"), n(v));
        members
    };
    let a = ClassValue::new(Rc::from("A"), member(1.0), vec![]);
    let b = ClassValue::new(Rc::from("B"), member(2.0), vec![]);
    let c = ClassValue::new(Rc::from("C"), Members::default(), vec![a, b]);
    assert_eq!(c.lookup("m"), Some(n(1.0)));

    // A grandparent on the left beats a parent on the right.
    let base = ClassValue::new(Rc::from("Base"), member(3.0), vec![]);
    let left = ClassValue::new(Rc::from("Left"), Members::default(), vec![base]);
    let right = ClassValue::new(Rc::from("Right"), member(4.0), vec![]);
    let d = ClassValue::new(Rc::from("D"), Members::default(), vec![left, right]);
    assert_eq!(d.lookup("m"), Some(n(3.0)));
}

#[test]
fn missing_attribute_messages() {
    let class = ClassValue::new(Rc::from("C"), Members::default(), vec![]);
    let object = Value::Object(ClassValue::create_object(&class));
    let err = object.get_member("nope").unwrap_err();
    assert_eq!(err.kind, ExcType::AttributeError);
    assert_eq!(err.message, "'C' object has no attribute 'nope'");
    assert_eq!(
        Value::Class(class).get_member("__name__").ok(),
        Some(Value::string("C"))
    );
}
