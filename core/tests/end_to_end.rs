// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end exercises of the derive macro against a live `Registry`: fixtures are declared
//! inline per scenario rather than shared across a `tests/common` module, matching the kind of
//! thing this engine is meant to make easy.

use std::any::TypeId;

use bson::{doc, Bson};
use bsoncodec::{Codec, CodecError, NoneHandling, Registry, RegistryBuilder};

#[derive(Codec, Debug, PartialEq)]
struct Person {
    #[codec(rename = "_id")]
    id: i32,
    name: String,
    middle: Option<String>,
}

#[test]
fn omit_policy_drops_absent_optional_field() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Person>()).unwrap();

    let person = Person {
        id: 1,
        name: "Ada".to_string(),
        middle: None,
    };
    let encoded = codec.encode_any(&person).unwrap();
    let doc = encoded.as_document().unwrap();
    assert!(!doc.contains_key("middle"));
    assert_eq!(doc.get_i32("_id").unwrap(), 1);

    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Person>().unwrap(), person);
}

#[test]
fn encode_as_null_policy_keeps_the_field_present() {
    let registry = RegistryBuilder::from(Registry::empty())
        .configure(|c| c.with_none_handling(NoneHandling::EncodeAsNull))
        .register::<Person>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Person>()).unwrap();

    let person = Person {
        id: 2,
        name: "Grace".to_string(),
        middle: None,
    };
    let encoded = codec.encode_any(&person).unwrap();
    assert_eq!(encoded.as_document().unwrap().get("middle"), Some(&Bson::Null));

    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Person>().unwrap(), person);
}

#[test]
fn unknown_field_on_wire_is_ignored_on_decode() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Person>()).unwrap();

    let wire = Bson::Document(doc! {
        "_id": 9,
        "name": "Hedy",
        "middle": Bson::Null,
        "nickname": "future field this version has never heard of",
    });
    let decoded = codec.decode_any(&wire).unwrap();
    assert_eq!(
        *decoded.downcast::<Person>().unwrap(),
        Person {
            id: 9,
            name: "Hedy".to_string(),
            middle: None,
        }
    );
}

#[derive(Codec, Debug, PartialEq)]
struct Company {
    name: String,
    employees: Option<Vec<Person>>,
}

#[test]
fn nested_record_and_optional_sequence_round_trip() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .register::<Company>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Company>()).unwrap();

    let company = Company {
        name: "TechCorp".to_string(),
        employees: Some(vec![
            Person {
                id: 1,
                name: "Ada".to_string(),
                middle: None,
            },
            Person {
                id: 2,
                name: "Grace".to_string(),
                middle: Some("Brewster".to_string()),
            },
        ]),
    };
    let encoded = codec.encode_any(&company).unwrap();
    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Company>().unwrap(), company);
}

#[test]
fn optional_sequence_present_but_empty_encodes_as_an_empty_array() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .register::<Company>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Company>()).unwrap();

    let company = Company {
        name: "TechCorp".to_string(),
        employees: Some(vec![]),
    };
    let encoded = codec.encode_any(&company).unwrap();
    assert_eq!(
        encoded.as_document().unwrap().get_array("employees").unwrap(),
        &Vec::<Bson>::new()
    );

    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Company>().unwrap(), company);
}

#[test]
fn optional_sequence_absent_is_omitted_under_the_default_none_policy() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .register::<Company>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Company>()).unwrap();

    let company = Company {
        name: "TechCorp".to_string(),
        employees: None,
    };
    let encoded = codec.encode_any(&company).unwrap();
    assert!(!encoded.as_document().unwrap().contains_key("employees"));

    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Company>().unwrap(), company);
}

#[derive(Codec, Debug, PartialEq)]
struct Settings {
    name: String,
    #[codec(default)]
    timeout_ms: i32,
}

#[test]
fn absent_field_with_default_attribute_falls_back_instead_of_erroring() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Settings>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Settings>()).unwrap();

    let wire = Bson::Document(doc! { "name": "prod" });
    let decoded = codec.decode_any(&wire).unwrap();
    assert_eq!(
        *decoded.downcast::<Settings>().unwrap(),
        Settings {
            name: "prod".to_string(),
            timeout_ms: 0,
        }
    );
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_page_size() -> i32 {
    20
}

#[derive(Codec, Debug, PartialEq)]
struct Preferences {
    #[codec(default = "default_theme")]
    theme: String,
    #[codec(default = "default_language")]
    language: String,
    #[codec(default = "default_page_size")]
    page_size: i32,
}

#[test]
fn absent_fields_fall_back_to_their_codec_default_fn() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Preferences>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Preferences>()).unwrap();

    let wire = Bson::Document(doc! {});
    let decoded = codec.decode_any(&wire).unwrap();
    assert_eq!(
        *decoded.downcast::<Preferences>().unwrap(),
        Preferences {
            theme: "dark".to_string(),
            language: "en".to_string(),
            page_size: 20,
        }
    );
}

#[test]
fn absent_required_field_without_default_is_a_missing_field_error() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Person>()).unwrap();

    let wire = Bson::Document(doc! { "_id": 1, "middle": Bson::Null });
    let err = codec.decode_any(&wire).unwrap_err();
    assert!(matches!(err, CodecError::MissingField { .. }));
}

#[derive(Codec, Debug, PartialEq)]
struct Dog {
    name: String,
}

#[derive(Codec, Debug, PartialEq)]
struct Cat {
    lives: i32,
}

#[derive(Codec, Debug, PartialEq)]
enum Animal {
    Dog(Dog),
    Cat(Cat),
}

#[test]
fn sealed_variant_dispatch_round_trips_every_variant() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register_sealed::<Animal>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Animal>()).unwrap();

    let dog = Animal::Dog(Dog {
        name: "Rex".to_string(),
    });
    let encoded_dog = codec.encode_any(&dog).unwrap();
    let dog_doc = encoded_dog.as_document().unwrap();
    assert_eq!(dog_doc.get_str("_t").unwrap(), "Dog");
    assert_eq!(
        dog_doc.keys().next().map(String::as_str),
        Some("_t"),
        "discriminator field must be written first, per the wire contract"
    );
    let decoded_dog = codec.decode_any(&encoded_dog).unwrap();
    assert_eq!(*decoded_dog.downcast::<Animal>().unwrap(), dog);

    let cat = Animal::Cat(Cat { lives: 9 });
    let encoded_cat = codec.encode_any(&cat).unwrap();
    assert_eq!(encoded_cat.as_document().unwrap().get_str("_t").unwrap(), "Cat");
    let decoded_cat = codec.decode_any(&encoded_cat).unwrap();
    assert_eq!(*decoded_cat.downcast::<Animal>().unwrap(), cat);
}

#[test]
fn sealed_variant_record_is_also_independently_registered() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register_sealed::<Animal>()
        .unwrap()
        .build();

    // `register_sealed` registers every variant's own record codec alongside the wrapper, so a
    // caller that only ever sees a `Dog` document (no wrapping `Animal` or discriminator) can
    // still decode it directly.
    let dog_codec = registry.get(TypeId::of::<Dog>()).unwrap();
    let dog = Dog {
        name: "Fido".to_string(),
    };
    let encoded = dog_codec.encode_any(&dog).unwrap();
    assert!(!encoded.as_document().unwrap().contains_key("_t"));
    let decoded = dog_codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Dog>().unwrap(), dog);
}

#[test]
fn unknown_discriminator_tag_is_rejected() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register_sealed::<Animal>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Animal>()).unwrap();

    let wire = Bson::Document(doc! { "_t": "Bird", "name": "Tweety" });
    let err = codec.decode_any(&wire).unwrap_err();
    assert!(matches!(err, CodecError::UnknownDiscriminator { .. }));
}

#[test]
fn missing_discriminator_field_is_rejected() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register_sealed::<Animal>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Animal>()).unwrap();

    let wire = Bson::Document(doc! { "name": "Rex" });
    let err = codec.decode_any(&wire).unwrap_err();
    match err {
        CodecError::MissingDiscriminator { type_name } => assert_eq!(type_name, "Animal"),
        other => panic!("expected MissingDiscriminator, got {other:?}"),
    }
}

#[test]
fn duplicate_registration_of_the_same_type_is_rejected() {
    let builder = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap();
    let err = builder.register::<Person>().unwrap_err();
    assert!(matches!(err, CodecError::DuplicateRegistration { .. }));
}

#[test]
fn register_all_macro_registers_every_listed_type_against_one_environment() {
    let builder = RegistryBuilder::from(Registry::empty());
    let builder = bsoncodec::register_all!(builder, Person, Company).unwrap();
    let registry = builder.build();

    assert!(registry.get(TypeId::of::<Person>()).is_ok());
    assert!(registry.get(TypeId::of::<Company>()).is_ok());
}

#[test]
fn register_if_skips_registration_when_the_condition_is_false() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register_if::<Person>(false)
        .unwrap()
        .build();
    assert!(registry.get(TypeId::of::<Person>()).is_err());
}

#[derive(Codec, Debug, PartialEq, Clone, Copy)]
enum Status {
    Active,
    Inactive,
    Pending,
}

#[test]
fn flat_enum_by_name_is_the_default_representation() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Status>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Status>()).unwrap();

    let encoded = codec.encode_any(&Status::Pending).unwrap();
    assert_eq!(encoded, Bson::String("Pending".to_string()));
    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Status>().unwrap(), Status::Pending);
}

#[derive(Codec, Debug, PartialEq, Clone, Copy)]
#[codec(by_ordinal)]
enum Priority {
    Low,
    Medium,
    High,
}

#[test]
fn flat_enum_by_ordinal_round_trips_and_rejects_out_of_range_values() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Priority>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Priority>()).unwrap();

    let encoded = codec.encode_any(&Priority::High).unwrap();
    assert_eq!(encoded, Bson::Int32(2));
    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<Priority>().unwrap(), Priority::High);

    let err = codec.decode_any(&Bson::Int32(99)).unwrap_err();
    assert!(matches!(err, CodecError::UnknownEnumOrdinal { .. }));
}

#[derive(Codec, Debug, PartialEq, Clone, Copy)]
#[codec(by_projection = "status_code")]
enum HttpClass {
    Success,
    ClientError,
    ServerError,
}

impl HttpClass {
    fn status_code(&self) -> i32 {
        match self {
            HttpClass::Success => 200,
            HttpClass::ClientError => 400,
            HttpClass::ServerError => 500,
        }
    }
}

#[test]
fn flat_enum_by_projection_round_trips_through_the_projected_value() {
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<HttpClass>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<HttpClass>()).unwrap();

    let encoded = codec.encode_any(&HttpClass::ClientError).unwrap();
    assert_eq!(encoded, Bson::Int32(400));
    let decoded = codec.decode_any(&encoded).unwrap();
    assert_eq!(*decoded.downcast::<HttpClass>().unwrap(), HttpClass::ClientError);
}

#[test]
fn builder_config_is_threaded_through_to_a_later_registered_nested_record() {
    // `Company` derives against the registry snapshot taken at its own `register` call, so a
    // `configure` applied before it (here: writing `None` as explicit null) is visible all the
    // way down through `Person`, its nested field type.
    let registry = RegistryBuilder::from(Registry::empty())
        .configure(|c| c.with_none_handling(NoneHandling::EncodeAsNull))
        .register::<Person>()
        .unwrap()
        .register::<Company>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Company>()).unwrap();

    let company = Company {
        name: "Acme".to_string(),
        employees: Some(vec![Person {
            id: 1,
            name: "Ada".to_string(),
            middle: None,
        }]),
    };
    let encoded = codec.encode_any(&company).unwrap();
    let employees = encoded
        .as_document()
        .unwrap()
        .get_array("employees")
        .unwrap();
    let first = employees[0].as_document().unwrap();
    assert_eq!(first.get("middle"), Some(&Bson::Null));
}

#[test]
fn custom_codec_config_is_not_affected_by_a_default_config_elsewhere() {
    // Sanity check that `CodecConfig` is a plain immutable value, not global state: a registry
    // built with defaults still omits absent optionals even though another test in this binary
    // builds a registry configured for `EncodeAsNull`.
    let registry = RegistryBuilder::from(Registry::empty())
        .register::<Person>()
        .unwrap()
        .build();
    let codec = registry.get(TypeId::of::<Person>()).unwrap();
    let person = Person {
        id: 3,
        name: "Katherine".to_string(),
        middle: None,
    };
    let encoded = codec.encode_any(&person).unwrap();
    assert!(!encoded.as_document().unwrap().contains_key("middle"));
}
