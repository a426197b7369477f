use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{
    config::{PipelineConfig, PipelineKind},
    envelope::{write_output, Envelope},
    error::{MapperError, Result},
    mapping::{map_rows, Schema},
    records::read_rows,
    schema::{pricebook_entry_schema, product_schema},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedSummary {
    pub products: RunSummary,
    pub entries: RunSummary,
}

pub fn schema_for(kind: &PipelineKind) -> Schema {
    match kind {
        PipelineKind::Products => product_schema(),
        PipelineKind::PricebookEntries { pricebook_id } => pricebook_entry_schema(pricebook_id),
    }
}

/// Reads `config.input`, maps every row and writes the envelope to
/// `config.output`. Nothing is written if any earlier step fails.
pub fn run(config: &PipelineConfig, kind: &PipelineKind) -> Result<RunSummary> {
    let envelope = load(config, &schema_for(kind))?;
    let contents = envelope.to_pretty_json()?;
    store(config, &envelope, &contents)
}

/// Runs the product and price book entry pipelines together.
///
/// Entry N references product N, so both inputs must have the same number
/// of rows. Both envelopes are mapped and rendered before either output is
/// written.
pub fn run_linked(
    products: &PipelineConfig,
    entries: &PipelineConfig,
    pricebook_id: &str,
) -> Result<LinkedSummary> {
    let product_envelope = load(products, &product_schema())?;
    let entry_envelope = load(entries, &pricebook_entry_schema(pricebook_id))?;

    if product_envelope.len() != entry_envelope.len() {
        return Err(MapperError::RowCountMismatch {
            products: product_envelope.len(),
            entries: entry_envelope.len(),
        });
    }

    let product_contents = product_envelope.to_pretty_json()?;
    let entry_contents = entry_envelope.to_pretty_json()?;

    Ok(LinkedSummary {
        products: store(products, &product_envelope, &product_contents)?,
        entries: store(entries, &entry_envelope, &entry_contents)?,
    })
}

fn load(config: &PipelineConfig, schema: &Schema) -> Result<Envelope> {
    let rows = read_rows(&config.input, config.delimiter)?;
    debug!(
        input = %config.input.display(),
        rows = rows.len(),
        "read source rows"
    );

    let envelope = map_rows(&rows, schema, config.numeric_mode)?;
    if envelope.is_empty() {
        warn!(input = %config.input.display(), "input has no data rows");
    }
    debug!(
        record_type = %schema.record_type,
        mode = ?config.numeric_mode,
        "mapped rows"
    );

    Ok(envelope)
}

fn store(config: &PipelineConfig, envelope: &Envelope, contents: &[u8]) -> Result<RunSummary> {
    write_output(&config.output, contents)?;
    info!(
        records = envelope.len(),
        output = %config.output.display(),
        "records written"
    );

    Ok(RunSummary {
        records: envelope.len(),
        output: config.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NumericMode;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::{fs, path::Path};

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_run_products() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("products.json");
        let config = PipelineConfig::new("test-inputs/products.csv", &output);

        let summary = run(&config, &PipelineKind::Products).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                records: 3,
                output: output.clone(),
            }
        );
        assert_eq!(
            read_json(&output),
            json!({
                "records": [
                    {
                        "attributes": { "type": "Product2", "referenceId": "ProductRef1" },
                        "ProductCode": "P100",
                        "Name": "Widget",
                        "Family": "Hardware",
                        "IsActive": true
                    },
                    {
                        "attributes": { "type": "Product2", "referenceId": "ProductRef2" },
                        "ProductCode": "P200",
                        "Name": "Gadget Pro",
                        "Family": "Hardware",
                        "IsActive": false
                    },
                    {
                        "attributes": { "type": "Product2", "referenceId": "ProductRef3" },
                        "ProductCode": "S300",
                        "Name": "Support; Premium",
                        "Family": "Services",
                        "IsActive": true
                    }
                ]
            })
        );
    }

    #[test]
    fn test_run_pricebook_entries() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("entries.json");
        let config = PipelineConfig::new("test-inputs/pricebook_entries.csv", &output);
        let kind = PipelineKind::PricebookEntries {
            pricebook_id: "01sJW000009KmOHYA0".into(),
        };

        let summary = run(&config, &kind).unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(
            read_json(&output),
            json!({
                "records": [
                    {
                        "attributes": { "type": "PricebookEntry", "referenceId": "PricebookEntryRef1" },
                        "Pricebook2Id": "01sJW000009KmOHYA0",
                        "Product2Id": "@ProductRef1",
                        "UnitPrice": 19.99,
                        "IsActive": true,
                        "UseStandardPrice": false
                    },
                    {
                        "attributes": { "type": "PricebookEntry", "referenceId": "PricebookEntryRef2" },
                        "Pricebook2Id": "01sJW000009KmOHYA0",
                        "Product2Id": "@ProductRef2",
                        "UnitPrice": 250.0,
                        "IsActive": true,
                        "UseStandardPrice": false
                    },
                    {
                        "attributes": { "type": "PricebookEntry", "referenceId": "PricebookEntryRef3" },
                        "Pricebook2Id": "01sJW000009KmOHYA0",
                        "Product2Id": "@ProductRef3",
                        "UnitPrice": 0.0,
                        "IsActive": false,
                        "UseStandardPrice": true
                    }
                ]
            })
        );
    }

    #[test]
    fn strict_run_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("entries.json");
        let config = PipelineConfig::new("test-inputs/pricebook_entries.csv", &output)
            .with_numeric_mode(NumericMode::Strict);
        let kind = PipelineKind::PricebookEntries {
            pricebook_id: "PB1".into(),
        };

        let err = run(&config, &kind).unwrap_err();

        assert!(matches!(err, MapperError::InvalidNumber { row: 3, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("products.json");
        let config = PipelineConfig::new(dir.path().join("nope.csv"), &output);

        let err = run(&config, &PipelineKind::Products).unwrap_err();

        assert!(matches!(err, MapperError::Io { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn rerun_produces_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        run(
            &PipelineConfig::new("test-inputs/products.csv", &first),
            &PipelineKind::Products,
        )
        .unwrap();
        run(
            &PipelineConfig::new("test-inputs/products.csv", &second),
            &PipelineKind::Products,
        )
        .unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("products.csv");
        let output = dir.path().join("products.json");
        fs::write(&input, "ProductCode,Name,Family,IsActive\nP1,One,Tools,true\n").unwrap();

        let config = PipelineConfig::new(&input, &output).with_delimiter(b',');
        run(&config, &PipelineKind::Products).unwrap();

        assert_eq!(read_json(&output)["records"][0]["Family"], json!("Tools"));
    }

    #[test]
    fn linked_run_writes_both_batches() {
        let dir = tempfile::tempdir().unwrap();
        let products = PipelineConfig::new("test-inputs/products.csv", dir.path().join("p.json"));
        let entries = PipelineConfig::new(
            "test-inputs/pricebook_entries.csv",
            dir.path().join("e.json"),
        );

        let summary = run_linked(&products, &entries, "PB1").unwrap();

        assert_eq!(summary.products.records, 3);
        assert_eq!(summary.entries.records, 3);

        let products_json = read_json(&products.output);
        let entries_json = read_json(&entries.output);
        for i in 0..3 {
            assert_eq!(
                entries_json["records"][i]["Product2Id"],
                json!(format!(
                    "@{}",
                    products_json["records"][i]["attributes"]["referenceId"]
                        .as_str()
                        .unwrap()
                ))
            );
        }
    }

    #[test]
    fn linked_run_rejects_mismatched_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let products = PipelineConfig::new("test-inputs/products.csv", dir.path().join("p.json"));
        let entries = PipelineConfig::new(
            "test-inputs/pricebook_entries_short.csv",
            dir.path().join("e.json"),
        );

        let err = run_linked(&products, &entries, "PB1").unwrap_err();

        assert!(matches!(
            err,
            MapperError::RowCountMismatch {
                products: 3,
                entries: 1
            }
        ));
        assert!(!products.output.exists());
        assert!(!entries.output.exists());
    }
}
