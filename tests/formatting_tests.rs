#[macro_use]
mod common;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use common::{BinaryTree, NestedConfig, nested, tree};
use toml_binder::{
    Binder, ClassRef, EnumDef, FieldDef, ModuleRef, Record, RecordDef, RecordValue, Registry, Table,
    TypeDecl, Value, format_toml_pair,
};

fn template<T: Record>() -> String {
    Binder::<T>::new().unwrap().format_toml_template().to_text().unwrap()
}

fn instance_template<T: Record>(instance: &T) -> String {
    Binder::from_instance(instance).unwrap().format_toml_template().to_text().unwrap()
}

fn plain<T: Record>(instance: &T) -> String {
    Binder::from_instance(instance).unwrap().format_toml().to_text().unwrap()
}

fn record_of<T: Record>(fields: &[(&str, Value)]) -> RecordValue {
    let mut record = RecordValue::new::<T>();
    for (name, value) in fields {
        record.set(*name, value.clone());
    }
    record
}

fn table(entries: &[(&str, Value)]) -> Value {
    Value::Table(
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect::<Table>(),
    )
}

fn strings(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|item| Value::String((*item).to_owned())).collect())
}

/// Format a single `value` field, then bind the text again.
fn round_trip<T: Record>(value: Value) -> toml_binder::Result<Value> {
    let text = Binder::from_instance(&T::from_record(record_of::<T>(&[("value", value)]))?)?
        .format_toml()
        .to_text()?;
    let mut bound = Binder::<T>::new()?.bind_record(&toml_binder::document::parse_str(&text)?)?;
    Ok(bound.remove("value").unwrap_or(Value::Boolean(false)))
}

// ----- single values -----

untyped_record!(
    IntListConfig,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::list(TypeDecl::Integer)))
);

#[test]
fn test_format_value_list_simple() {
    let value = Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    assert_eq!(round_trip::<IntListConfig>(value.clone()).unwrap(), value);
}

untyped_record!(
    DurationListConfig,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::list(TypeDecl::Duration)))
);

#[test]
fn test_format_value_list_suffix() {
    let empty = Value::Array(Vec::new());
    assert_eq!(round_trip::<DurationListConfig>(empty.clone()).unwrap(), empty);
    let hours = Value::Array(vec![Value::Duration(TimeDelta::hours(2))]);
    assert_eq!(round_trip::<DurationListConfig>(hours.clone()).unwrap(), hours);

    let days = Value::Array(vec![Value::Duration(TimeDelta::days(2))]);
    let err = round_trip::<DurationListConfig>(days).unwrap_err();
    assert_eq!(err.to_string(), "Value 2 days in array cannot be expressed without key suffix");
}

untyped_record!(
    IntDictConfig,
    RecordDef::new().field(FieldDef::new(
        "value",
        TypeDecl::dict(TypeDecl::String, TypeDecl::Integer)
    ))
);

#[test]
fn test_format_value_dict() {
    let mut entries =
        vec![("a", Value::Integer(1)), ("b", Value::Integer(2)), ("c", Value::Integer(3))];
    let value = table(&entries);
    assert_eq!(format_toml_pair("value", &value).unwrap(), "value = {a = 1, b = 2, c = 3}");
    assert_eq!(round_trip::<IntDictConfig>(value.clone()).unwrap(), value);

    entries.extend([
        ("a space", Value::Integer(4)),
        ("a.dot", Value::Integer(5)),
        ("", Value::Integer(6)),
    ]);
    let value = table(&entries);
    assert_eq!(
        format_toml_pair("value", &value).unwrap(),
        "value = {a = 1, b = 2, c = 3, 'a space' = 4, 'a.dot' = 5, '' = 6}"
    );
    assert_eq!(round_trip::<IntDictConfig>(value.clone()).unwrap(), value);
}

untyped_record!(
    DurationDictConfig,
    RecordDef::new().field(FieldDef::new(
        "value",
        TypeDecl::dict(TypeDecl::String, TypeDecl::Duration)
    ))
);

#[test]
fn test_format_value_dict_suffix() {
    assert_eq!(round_trip::<DurationDictConfig>(table(&[])).unwrap(), table(&[]));
    let delay = table(&[("delay", Value::Duration(TimeDelta::hours(2)))]);
    assert_eq!(round_trip::<DurationDictConfig>(delay.clone()).unwrap(), delay);
    assert_eq!(
        format_toml_pair("value", &table(&[("delay", Value::Duration(TimeDelta::days(2)))]))
            .unwrap(),
        "value = {delay-days = 2}"
    );
}

#[test]
fn test_format_value_references() {
    let class = Value::Class(ClassRef::new("logging", "Handler"));
    assert_eq!(format_toml_pair("handler", &class).unwrap(), "handler = 'logging.Handler'");
    let module = Value::Module(ModuleRef::new("plugins.example"));
    assert_eq!(format_toml_pair("plugin", &module).unwrap(), "plugin = 'plugins.example'");
    assert_eq!(
        format_toml_pair("path", &Value::Path("secrets/copper.key".into())).unwrap(),
        "path = 'secrets/copper.key'"
    );
}

#[test]
fn test_format_value_enums() {
    let color = EnumDef::named("Color", ["RED", "GREEN"]);
    let number = EnumDef::integer("Number", [("ONE", 1), ("TWO", 2)]);
    let green = color.by_name("green").map(Value::Enum).unwrap();
    let two = number.by_value(2).map(Value::Enum).unwrap();
    assert_eq!(format_toml_pair("color", &green).unwrap(), "color = 'green'");
    assert_eq!(format_toml_pair("number", &two).unwrap(), "number = 2");
}

untyped_record!(Empty, RecordDef::new());

#[test]
fn test_format_empty_record() {
    assert_eq!(Binder::<Empty>::new().unwrap().format_toml_template().count(), 0);
}

untyped_record!(
    Inner,
    RecordDef::new()
        .field(FieldDef::new("key_containing_underscores", TypeDecl::Boolean))
        .field(FieldDef::new("maybesuffix", TypeDecl::Duration))
        .field(FieldDef::new("behind_the_curtain", TypeDecl::String).default("wizard").derived())
);

untyped_record!(
    InnerValueConfig,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::record::<Inner>()))
);

#[test]
fn test_format_value_nested_record() {
    let value = Value::Record(record_of::<Inner>(&[
        ("key_containing_underscores", Value::Boolean(true)),
        ("maybesuffix", Value::Duration(TimeDelta::days(2))),
    ]));
    assert_eq!(
        format_toml_pair("value", &value).unwrap(),
        "value = {key-containing-underscores = true, maybesuffix-days = 2}"
    );
    assert_eq!(round_trip::<InnerValueConfig>(value.clone()).unwrap(), value);
}

// ----- templates -----

untyped_record!(
    TemplateConfig,
    RecordDef::new()
        .field(FieldDef::new("happiness", TypeDecl::String).doc("Field without default."))
        .field(FieldDef::new("flag", TypeDecl::Boolean))
        .field(FieldDef::new("module", TypeDecl::Module).doc(
            "
            Multi-line docstring.
            "
        ))
        .field(
            FieldDef::new("custom_class", TypeDecl::optional(TypeDecl::class()))
                .optional()
                .doc("Optional field.")
        )
        .field(
            FieldDef::new("number", TypeDecl::Integer)
                .default(123_i64)
                .doc("Field with default value.")
        )
        .field(FieldDef::new("another_number", TypeDecl::Float).default(0.5).doc(
            "
            This docstring...

            ...consists of multiple paragraphs.
            "
        ))
        .field(FieldDef::new("expiry", TypeDecl::Duration))
        .field(FieldDef::new("certificate", TypeDecl::Path))
        .field(FieldDef::new("multi_type", TypeDecl::union([TypeDecl::String, TypeDecl::Integer])))
        .field(FieldDef::new("derived", TypeDecl::Integer).derived().doc("Excluded field."))
);

#[test]
fn test_format_template_full() {
    assert_eq!(
        template::<TemplateConfig>(),
        "\
# Field without default.
# Mandatory.
happiness = '???'

# Mandatory.
flag = true | false

# Multi-line docstring.
# Mandatory.
module = 'fully.qualified.module.name'

# Optional field.
# Optional.
# custom-class = 'fully.qualified.class.name'

# Field with default value.
# Default:
# number = 123

# This docstring...
#
# ...consists of multiple paragraphs.
#
# Default:
# another-number = 0.5

# Mandatory.
expiry = 00:00:00

# Mandatory.
certificate = '/path/to/dir_or_file'

# Mandatory.
multi-type = '???' | 0"
    );
}

untyped_record!(
    TemplateValueConfig,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::record::<TemplateConfig>()))
);

#[test]
fn test_format_record_inline() {
    let value = Value::Record(record_of::<TemplateConfig>(&[
        ("happiness", Value::String("easy".into())),
        ("flag", Value::Boolean(true)),
        ("module", Value::Module(ModuleRef::new("tests.example"))),
        ("number", Value::Integer(123)),
        ("another_number", Value::Float(0.5)),
        ("expiry", Value::Duration(TimeDelta::days(3))),
        ("certificate", Value::Path("secrets/copper.key".into())),
        ("multi_type", Value::Integer(-1)),
    ]));
    let formatted = format_toml_pair("value", &value).unwrap();
    assert_eq!(
        formatted,
        "value = {\
         happiness = 'easy', \
         flag = true, \
         module = 'tests.example', \
         number = 123, \
         another-number = 0.5, \
         expiry-days = 3, \
         certificate = 'secrets/copper.key', \
         multi-type = -1}"
    );

    let mut registry = Registry::new();
    registry.register_module("tests.example");
    let document = toml_binder::document::parse_str(&formatted).unwrap();
    let bound = Binder::<TemplateValueConfig>::new()
        .unwrap()
        .with_registry(Arc::new(registry))
        .bind_record(&document)
        .unwrap();
    assert_eq!(bound.get("value"), Some(&value));
}

fn expected_nested(name: &str, inner_int: i64, inner_str: &str, optional_table: bool) -> String {
    let optional_table = if optional_table { "# Optional table.\n" } else { "" };
    format!(
        "\
# This table is bound to a nested record.
# This is the docstring for the nested field.
{optional_table}[{name}]

# Mandatory.
inner-int = {inner_int}

# Mandatory.
inner-str = '{inner_str}'

# Optional.
# optional = '???'

# Default:
# with-default = 'n/a'"
    )
}

const NESTED_DOC: &str = "This is the docstring for the nested field.";

untyped_record!(
    OptionalNestedConfig,
    RecordDef::new().field(
        FieldDef::new("nested", TypeDecl::optional(TypeDecl::record::<NestedConfig>()))
            .optional()
            .doc(NESTED_DOC)
    )
);

#[test]
fn test_format_template_optional_nested() {
    assert_eq!(template::<OptionalNestedConfig>(), expected_nested("nested", 0, "???", true));
}

untyped_record!(
    MappingNestedConfig,
    RecordDef::new().field(
        FieldDef::new(
            "nested",
            TypeDecl::dict(TypeDecl::String, TypeDecl::record::<NestedConfig>())
        )
        .doc(NESTED_DOC)
    )
);

#[test]
fn test_format_template_mapping_nested_class() {
    assert_eq!(
        template::<MappingNestedConfig>(),
        expected_nested("nested.<name>", 0, "???", false)
    );
}

#[test]
fn test_format_template_mapping_nested_value() {
    let config = MappingNestedConfig(record_of::<MappingNestedConfig>(&[(
        "nested",
        table(&[("first", nested(1, "one")), ("second", nested(2, "two"))]),
    )]));
    assert_eq!(
        instance_template(&config),
        [
            expected_nested("nested.first", 1, "one", false),
            String::new(),
            expected_nested("nested.second", 2, "two", false),
        ]
        .join("\n")
    );
}

const UNTYPED_DOC: &str = "This is the docstring for the untyped field.";

untyped_record!(
    OptionalUntypedMapping,
    RecordDef::new().field(
        FieldDef::new(
            "untyped",
            TypeDecl::optional(TypeDecl::dict(TypeDecl::String, TypeDecl::Any))
        )
        .optional()
        .doc(UNTYPED_DOC)
    )
);

#[test]
fn test_format_template_mapping_untyped_class() {
    assert_eq!(
        template::<OptionalUntypedMapping>(),
        "# This is the docstring for the untyped field.\n# Optional table.\n[untyped]"
    );
}

untyped_record!(
    UntypedMapping,
    RecordDef::new().field(
        FieldDef::new("untyped", TypeDecl::dict(TypeDecl::String, TypeDecl::Any)).doc(UNTYPED_DOC)
    )
);

#[test]
fn test_format_template_mapping_untyped_value() {
    let config = UntypedMapping(record_of::<UntypedMapping>(&[(
        "untyped",
        table(&[("one", Value::Integer(1)), ("two", Value::Float(2.0))]),
    )]));
    assert_eq!(
        instance_template(&config),
        "# This is the docstring for the untyped field.\n[untyped]\none = 1\ntwo = 2.0"
    );
}

untyped_record!(
    DefaultListConfig,
    RecordDef::new().field(
        FieldDef::new("words", TypeDecl::list(TypeDecl::String)).default(Vec::<String>::new())
    )
);

#[test]
fn test_format_template_default_empty_list() {
    let expected = "# Default:\n# words = []";
    assert_eq!(template::<DefaultListConfig>(), expected);
    let config =
        DefaultListConfig(record_of::<DefaultListConfig>(&[("words", Value::Array(Vec::new()))]));
    assert_eq!(instance_template(&config), expected);
}

untyped_record!(
    SequenceDefaultConfig,
    RecordDef::new().field(
        FieldDef::new("things", TypeDecl::sequence(TypeDecl::String)).default(vec!["this", "that"])
    )
);

#[test]
fn test_format_template_sequence_default() {
    let things = strings(&["this", "that"]);
    let config = SequenceDefaultConfig(record_of::<SequenceDefaultConfig>(&[("things", things)]));
    assert_eq!(instance_template(&config), "# Default:\n# things = ['this', 'that']");
}

untyped_record!(
    SequenceNestedConfig,
    RecordDef::new().field(
        FieldDef::new("nested", TypeDecl::list(TypeDecl::record::<NestedConfig>())).doc(NESTED_DOC)
    )
);

#[test]
fn test_format_template_sequence_nested_class() {
    assert_eq!(template::<SequenceNestedConfig>(), expected_nested("[nested]", 0, "???", false));
}

#[test]
fn test_format_template_sequence_nested_value() {
    let config = SequenceNestedConfig(record_of::<SequenceNestedConfig>(&[(
        "nested",
        Value::Array(vec![nested(1, "one"), nested(2, "two")]),
    )]));
    assert_eq!(
        instance_template(&config),
        [
            expected_nested("[nested]", 1, "one", false),
            String::new(),
            expected_nested("[nested]", 2, "two", false),
        ]
        .join("\n")
    );
}

untyped_record!(
    OptionalUntypedSequence,
    RecordDef::new().field(
        FieldDef::new("untyped", TypeDecl::optional(TypeDecl::list(TypeDecl::Any)))
            .optional()
            .doc(UNTYPED_DOC)
    )
);

#[test]
fn test_format_template_sequence_untyped_class() {
    assert_eq!(
        template::<OptionalUntypedSequence>(),
        "# This is the docstring for the untyped field.\n# Optional table.\n[[untyped]]"
    );
}

untyped_record!(
    UntypedSequence,
    RecordDef::new().field(FieldDef::new("untyped", TypeDecl::list(TypeDecl::Any)).doc(UNTYPED_DOC))
);

fn untyped_sequence(items: Vec<Value>) -> UntypedSequence {
    UntypedSequence(record_of::<UntypedSequence>(&[("untyped", Value::Array(items))]))
}

#[test]
fn test_format_template_sequence_untyped_value_table() {
    let inner = untyped_sequence(vec![Value::String("three".into()), Value::Boolean(false)]);
    let config = untyped_sequence(vec![
        table(&[("one", Value::Integer(1)), ("two", Value::Float(2.0))]),
        Value::Record(inner.0),
    ]);
    assert_eq!(
        instance_template(&config),
        "\
# This is the docstring for the untyped field.
[[untyped]]
one = 1
two = 2.0

# This is the docstring for the untyped field.
[[untyped]]
untyped = ['three', false]"
    );
}

#[test]
fn test_format_template_sequence_untyped_value_inline() {
    let inner = untyped_sequence(vec![Value::String("three".into()), Value::Boolean(false)]);
    let config =
        untyped_sequence(vec![Value::Integer(1), Value::Float(2.0), Value::Record(inner.0)]);
    assert_eq!(
        instance_template(&config),
        "\
# This is the docstring for the untyped field.
# Mandatory.
untyped = [1, 2.0, {untyped = ['three', false]}]"
    );
}

// ----- templates are valid input -----

untyped_record!(StringValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::String)));
untyped_record!(FloatValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Float)));
untyped_record!(DateTimeValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::DateTime)));
untyped_record!(DateValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Date)));
untyped_record!(DurationValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Duration)));
untyped_record!(
    ListValue,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::list(TypeDecl::String)))
);
untyped_record!(
    NestedValue,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::record::<NestedConfig>()))
);
untyped_record!(
    OptionalNestedValue,
    RecordDef::new().field(
        FieldDef::new("value", TypeDecl::optional(TypeDecl::record::<NestedConfig>())).optional()
    )
);

fn assert_template_binds<T: Record>() {
    let text = template::<T>();
    let document = toml_binder::document::parse_str(&text)
        .unwrap_or_else(|err| {
            panic!("template for {} is not valid TOML: {err}\n{text}", T::name())
        });
    if let Err(err) = Binder::<T>::new().unwrap().bind_record(&document) {
        panic!("template for {} does not bind: {err}\n{text}", T::name());
    }
}

#[test]
fn test_format_template_valid_value() {
    assert_template_binds::<StringValue>();
    assert_template_binds::<FloatValue>();
    assert_template_binds::<DateTimeValue>();
    assert_template_binds::<DateValue>();
    assert_template_binds::<DurationValue>();
    assert_template_binds::<ListValue>();
    assert_template_binds::<IntDictConfig>();
    assert_template_binds::<NestedValue>();
    assert_template_binds::<OptionalNestedValue>();
}

// ----- exact round trips -----

untyped_record!(IntegerValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Integer)));
untyped_record!(BooleanValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Boolean)));
untyped_record!(TimeValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Time)));
untyped_record!(AnyValue, RecordDef::new().field(FieldDef::new("value", TypeDecl::Any)));
untyped_record!(
    OptionalStringValue,
    RecordDef::new().field(FieldDef::new("value", TypeDecl::optional(TypeDecl::String)).optional())
);

fn example_strings() -> Vec<Value> {
    [
        "",
        "simple",
        "single'quote",
        "double\"quote",
        "\"both\" 'quotes'",
        "embedded\nnewline",
        r"back\slash",
        "I'm a string. \"You can quote me\". Name\tJos\u{E9}\nLocation\tSF.",
        "complex string with back\\slash, \"both\" 'quotes' and \u{0}control\u{7F}chars\u{7}",
        "\u{1F44D}",
    ]
    .into_iter()
    .map(|text| Value::String(text.to_owned()))
    .collect()
}

fn example_native_values() -> Vec<Value> {
    let date = NaiveDate::from_ymd_opt(2022, 10, 5).unwrap();
    let time = NaiveTime::from_hms_opt(19, 16, 29).unwrap();
    let mut values = vec![
        Value::Integer(-1),
        Value::Integer(0),
        Value::Integer(12345),
        Value::Float(-1.0),
        Value::Float(0.0),
        Value::Float(3.1415927),
        Value::Float(1.23e30),
        Value::Float(1.23e-30),
        Value::Boolean(true),
        Value::Boolean(false),
    ];
    values.extend(example_strings());
    values.extend([Value::Date(date), Value::DateTime(date.and_time(time)), Value::Time(time)]);
    values
}

fn example_durations() -> Vec<Value> {
    [
        TimeDelta::hours(12) + TimeDelta::minutes(34) + TimeDelta::seconds(56),
        TimeDelta::microseconds(99_999_999_999),
        TimeDelta::milliseconds(99_999_999),
        TimeDelta::seconds(99_999),
        TimeDelta::minutes(2_000),
        TimeDelta::hours(83),
        TimeDelta::days(2),
        TimeDelta::weeks(3),
        TimeDelta::zero(),
        TimeDelta::hours(-1),
        TimeDelta::seconds(-90),
        TimeDelta::milliseconds(-1),
        TimeDelta::days(-10),
    ]
    .into_iter()
    .map(Value::Duration)
    .collect()
}

fn assert_round_trips<T: Record>(values: &[Value]) {
    for value in values {
        match round_trip::<T>(value.clone()) {
            Ok(bound) => assert_eq!(&bound, value, "{} did not round trip", T::name()),
            Err(err) => panic!("{value:?} in {} failed to round trip: {err}", T::name()),
        }
    }
}

#[test]
fn test_format_value_round_trip_exact() {
    let native = example_native_values();
    let of_kind = |kind: &str| {
        native.iter().filter(|value| value.kind() == kind).cloned().collect::<Vec<_>>()
    };
    assert_round_trips::<IntegerValue>(&of_kind("integer"));
    assert_round_trips::<FloatValue>(&of_kind("float"));
    assert_round_trips::<BooleanValue>(&of_kind("boolean"));
    assert_round_trips::<StringValue>(&example_strings());
    assert_round_trips::<OptionalStringValue>(&example_strings());
    assert_round_trips::<DateValue>(&of_kind("date"));
    assert_round_trips::<TimeValue>(&of_kind("time"));
    assert_round_trips::<DateTimeValue>(&of_kind("datetime"));
    assert_round_trips::<DurationValue>(&example_durations());
}

#[test]
fn test_format_value_round_trip_any() {
    assert_round_trips::<AnyValue>(&example_native_values());
}

// ----- populated output -----

untyped_record!(
    MiddleConfig,
    RecordDef::new()
        .doc("This docstring will remain invisible, as its table is empty.")
        .field(
            FieldDef::new("deepest", TypeDecl::optional(TypeDecl::record::<NestedConfig>()))
                .optional()
        )
);

untyped_record!(
    PopulatedConfig,
    RecordDef::new()
        .field(
            FieldDef::new("source_database_connection_url", TypeDecl::String)
                .doc("Database to read the data from.")
        )
        .field(
            FieldDef::new("destination_database_connection_url", TypeDecl::String)
                .default("sqlite://")
                .doc("Database to write the data to.")
        )
        .field(FieldDef::new("middle", TypeDecl::record::<MiddleConfig>()))
        .field(
            FieldDef::new("webhook_urls", TypeDecl::tuple_of(TypeDecl::String))
                .default(Vec::<String>::new())
        )
);

fn populated() -> PopulatedConfig {
    PopulatedConfig(record_of::<PopulatedConfig>(&[
        (
            "source_database_connection_url",
            Value::String("postgresql://<username>:<password>@<hostname>/<database name>".into()),
        ),
        ("destination_database_connection_url", Value::String("sqlite://".into())),
        ("middle", Value::Record(record_of::<MiddleConfig>(&[("deepest", nested(5, "foo"))]))),
        ("webhook_urls", strings(&["https://host1/refresh", "https://host2/refresh"])),
    ]))
}

#[test]
fn test_format_template_populated() {
    assert_eq!(
        instance_template(&populated()),
        "\
# Database to read the data from.
# Mandatory.
source-database-connection-url = 'postgresql://<username>:<password>@<hostname>/<database name>'

# Database to write the data to.
# Default:
# destination-database-connection-url = 'sqlite://'

# Default:
# webhook-urls = []
webhook-urls = ['https://host1/refresh', 'https://host2/refresh']

# This table is bound to a nested record.
# Optional table.
[middle.deepest]

# Mandatory.
inner-int = 5

# Mandatory.
inner-str = 'foo'

# Optional.
# optional = '???'

# Default:
# with-default = 'n/a'"
    );
}

#[test]
fn test_format_populated() {
    assert_eq!(
        plain(&populated()),
        "\
# Database to read the data from.
source-database-connection-url = 'postgresql://<username>:<password>@<hostname>/<database name>'
webhook-urls = ['https://host1/refresh', 'https://host2/refresh']

# This table is bound to a nested record.
[middle.deepest]
inner-int = 5
inner-str = 'foo'"
    );
}

untyped_record!(
    OptionalTablesConfig,
    RecordDef::new()
        .field(
            FieldDef::new("untyped_mandatory", TypeDecl::dict(TypeDecl::String, TypeDecl::Any))
                .doc("This is the docstring for the mandatory untyped field.")
        )
        .field(
            FieldDef::new("untyped_optional", TypeDecl::dict(TypeDecl::String, TypeDecl::Any))
                .default(Table::new())
                .doc("This is the docstring for the optional untyped field.")
        )
        .field(
            FieldDef::new("nested", TypeDecl::optional(TypeDecl::record::<NestedConfig>()))
                .optional()
                .doc("Optional nested record.")
        )
);

#[test]
fn test_format_optional_tables() {
    let expected = "# This is the docstring for the mandatory untyped field.\n[untyped-mandatory]";
    let text = Binder::<OptionalTablesConfig>::new().unwrap().format_toml().to_text().unwrap();
    assert_eq!(text, expected);

    let config = OptionalTablesConfig(record_of::<OptionalTablesConfig>(&[
        ("untyped_mandatory", table(&[])),
        ("untyped_optional", table(&[])),
    ]));
    assert_eq!(plain(&config), expected);
}

// ----- recursive records -----

#[test]
fn test_format_template_depth_first() {
    let root = tree(
        1,
        Some(tree(2, Some(tree(3, None, None)), Some(tree(4, None, None)))),
        Some(tree(5, Some(tree(6, None, None)), Some(tree(7, None, None)))),
    );
    let Value::Record(root) = root else {
        unreachable!("tree() builds records");
    };
    let mut expected = vec!["# Mandatory.\nvalue = 1".to_owned()];
    for (path, value) in [
        ("left", 2),
        ("left.left", 3),
        ("left.right", 4),
        ("right", 5),
        ("right.left", 6),
        ("right.right", 7),
    ] {
        expected.push(format!("# Optional table.\n[{path}]\n\n# Mandatory.\nvalue = {value}"));
    }
    assert_eq!(instance_template(&BinaryTree(root)), expected.join("\n\n"));
}

#[test]
fn test_format_template_recursive_class() {
    assert_eq!(
        template::<BinaryTree>(),
        "# Mandatory.\nvalue = 0\n\n# Optional table.\n[left]\n\n# Optional table.\n[right]"
    );
}
