#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use queryable::sql::{is_valid_sql_identifier, postgres, sqlite};
use queryable::{AllowedFieldSet, Limits, QueryParser, log};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    query: String,
    allowed: Vec<String>,
    hidden: Vec<String>,
    allow_all: bool,
    encoded: bool,
}

fuzz_target!(|input: FuzzInput| {
    log::set_enabled(false);

    let mut fields = AllowedFieldSet::new()
        .with_fields(input.allowed)
        .with_hidden(input.hidden.clone());
    if input.allow_all {
        fields.allow_all();
    }
    let parser = QueryParser::new(fields).limits(Limits::new());

    let result = if input.encoded {
        parser.parse_encoded(Some(&input.query))
    } else {
        parser.parse(&input.query)
    };

    // Hidden fields never come out, whatever the allow-list says
    for descriptor in &result {
        assert!(!input.hidden.iter().any(|h| h == descriptor.key()));
        assert!(!descriptor.key().is_empty());
    }

    // Rendering must not panic; only SQL-safe fields can bind parameters
    let bindable = result
        .iter()
        .filter(|d| is_valid_sql_identifier(d.key()))
        .count();
    let pg = result.apply_to(postgres("t")).build();
    let _ = result.apply_to(sqlite("t")).build();
    assert!(pg.params.len() <= bindable);
});
