// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Wire format contract: element names, attribute presence, child order and
// canonical strings for the public model types.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]

use cimxml::xml::{attr, tag};
use cimxml::{
    decode, encode, CimError, CimObject, Class, ClassName, ClassPath, Decoded, Instance,
    InstanceName, KeyValue, Method, NamespacePath, ObjectPath, Parameter, Property,
    PropertyReference, Qualifier, Scalar, ToXml,
};

#[test]
fn class_path_canonical_string_and_nesting() {
    let path = ClassPath::new("root/cimv2", "CIM_Foo").with_host("leonardo").expect("host");
    assert_eq!(path.to_string(), "//leonardo/root/cimv2:CIM_Foo");
    assert_eq!(
        encode(&path.into()).expect("encode").to_string(),
        concat!(
            "<CLASSPATH><NAMESPACEPATH><HOST>leonardo</HOST>",
            r#"<LOCALNAMESPACEPATH><NAMESPACE NAME="root"/><NAMESPACE NAME="cimv2"/></LOCALNAMESPACEPATH>"#,
            r#"</NAMESPACEPATH><CLASSNAME NAME="CIM_Foo"/></CLASSPATH>"#
        )
    );
}

#[test]
fn namespace_path_without_host() {
    let e = NamespacePath::new("root").to_xml().expect("encode");
    assert_eq!(
        e.to_string(),
        r#"<NAMESPACEPATH><LOCALNAMESPACEPATH><NAMESPACE NAME="root"/></LOCALNAMESPACEPATH></NAMESPACEPATH>"#
    );
}

#[test]
fn instance_name_canonical_string_follows_insertion_order() {
    let name = InstanceName::with_keybindings(
        "CIM_Foo",
        [("Count", KeyValue::Int(42)), ("Foo", KeyValue::from("Bar"))],
    );
    assert_eq!(name.to_string(), r#"CIM_Foo.Count=42,Foo="Bar""#);

    let swapped = InstanceName::with_keybindings(
        "CIM_Foo",
        [("Foo", KeyValue::from("Bar")), ("Count", KeyValue::Int(42))],
    );
    assert_eq!(name, swapped);
    assert_ne!(name.to_string(), swapped.to_string());
}

#[test]
fn instance_rejects_raw_numbers_but_accepts_typed_scalars() {
    let mut inst = Instance::new("CIM_Foo");
    assert!(matches!(inst.set("Count", 5), Err(CimError::Type(_))));
    assert!(matches!(inst.set("Count", 5.0), Err(CimError::Type(_))));

    inst.set("Count", Scalar::Uint8(5)).expect("typed scalar");
    let e = encode(&CimObject::Instance(inst)).expect("encode");
    let prop = e.child_elements().next().expect("property");
    assert_eq!(prop.attribute(attr::TYPE), Some("uint8"));
    let value = prop.child_elements().next().expect("value");
    assert_eq!(value.name(), tag::VALUE);
    assert_eq!(value.text_content(), "5");
}

#[test]
fn instance_encoding_preserves_property_order() {
    let names = ["Zulu", "Alpha", "Mike", "Bravo", "Yankee"];
    let mut inst = Instance::new("CIM_Ordered");
    for (i, n) in names.iter().enumerate() {
        let i = u32::try_from(i).expect("index");
        inst.set(*n, Scalar::Uint32(i)).expect("set");
    }
    let e = inst.to_xml().expect("encode");
    let encoded: Vec<_> = e
        .child_elements()
        .filter_map(|p| p.attribute(attr::NAME))
        .collect();
    assert_eq!(encoded, names);
}

#[test]
fn property_reference_wraps_value_reference() {
    let target = ClassName::new("CIM_System");
    let r = PropertyReference::new("Owner", target)
        .expect("reference")
        .with_reference_class("CIM_System");
    assert_eq!(
        encode(&r.into()).expect("encode").to_string(),
        concat!(
            r#"<PROPERTY.REFERENCE NAME="Owner" REFERENCECLASS="CIM_System">"#,
            r#"<VALUE.REFERENCE><CLASSNAME NAME="CIM_System"/></VALUE.REFERENCE>"#,
            "</PROPERTY.REFERENCE>"
        )
    );
}

#[test]
fn class_encoding_nests_everything() {
    let class = Class::builder("CIM_Service")
        .superclass("CIM_LogicalElement")
        .qualifier(Qualifier::new("Abstract", true).expect("qualifier"))
        .property(Property::new("Started", false).expect("property"))
        .method(
            Method::builder("StartService")
                .return_type(cimxml::CimType::Uint32)
                .parameter(Parameter::new("Timeout", cimxml::CimType::Uint32).expect("param"))
                .build(),
        )
        .build();
    assert_eq!(
        encode(&class.into()).expect("encode").to_string(),
        concat!(
            r#"<CLASS NAME="CIM_Service" SUPERCLASS="CIM_LogicalElement">"#,
            r#"<QUALIFIER NAME="Abstract" TYPE="boolean"><VALUE>TRUE</VALUE></QUALIFIER>"#,
            r#"<PROPERTY NAME="Started" TYPE="boolean"><VALUE>FALSE</VALUE></PROPERTY>"#,
            r#"<METHOD NAME="StartService" TYPE="uint32"><PARAMETER NAME="Timeout" TYPE="uint32"/></METHOD>"#,
            "</CLASS>"
        )
    );
}

#[test]
fn generic_encode_of_heterogeneous_sequence() {
    let seq = CimObject::Sequence(vec![
        CimObject::Bool(false),
        CimObject::Int(3),
        CimObject::Path(ObjectPath::from(ClassName::new("CIM_A"))),
    ]);
    assert_eq!(
        encode(&seq).expect("encode").to_string(),
        r#"<VALUE.ARRAY><VALUE>FALSE</VALUE><VALUE>3</VALUE><CLASSNAME NAME="CIM_A"/></VALUE.ARRAY>"#
    );
}

#[test]
fn decode_contract() {
    assert_eq!(
        decode("boolean", "TRUE").expect("bool"),
        Decoded::Scalar(Scalar::Boolean(true))
    );
    assert!(matches!(decode("boolean", "maybe"), Err(CimError::Value(_))));
    assert!(decode("datetime", "20040101120000.000000+060").is_ok());
    assert!(matches!(decode("datetime", "not-a-date"), Err(CimError::Value(_))));
    assert!(matches!(decode("char16", "a"), Err(CimError::Value(_))));
    assert!(matches!(decode("bogus", "a"), Err(CimError::Value(_))));
}

#[test]
fn cross_kind_paths_are_never_equal() {
    let class_path = ObjectPath::from(ClassPath::new("root", "CIM_Foo"));
    let instance_name = ObjectPath::from(InstanceName::new("CIM_Foo"));
    assert_ne!(class_path, instance_name);
    assert!(class_path.partial_cmp(&instance_name).is_none());
}
