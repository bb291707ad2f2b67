// src/process/mod.rs
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Terminator};
use tracing::{debug, info, warn};

use crate::record::Record;

pub mod date_parser;
pub mod schema;
pub mod utils;

/// Records decoded from one registry export.
#[derive(Debug, Default)]
pub struct ParsedRegistry {
    /// Column count announced by the header row.
    pub header_len: usize,
    /// Kept rows, in file order.
    pub records: Vec<Record>,
    /// Rows skipped because their column count differed from the header's.
    pub dropped_rows: usize,
}

/// Split `raw` into rows and `;`-separated cells and decode every row whose
/// column count matches the header's.
///
/// - The first row is the header; only its length matters.
/// - Rows with a different column count are logged and dropped whole.
/// - Remaining rows are decoded positionally via [`schema::COLUMNS`].
#[tracing::instrument(level = "info", skip(raw), fields(bytes = raw.len()))]
pub fn parse_registry(raw: &str) -> Result<ParsedRegistry> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // mismatched rows are filtered below, not rejected by the reader
        .quoting(false)
        .delimiter(b';')
        // rows end at `\n` only; a trailing `\r` is trimmed with the cell
        .terminator(Terminator::Any(b'\n'))
        .from_reader(raw.as_bytes());

    let mut rows = rdr.records();

    let header = match rows.next() {
        Some(result) => result.context("CSV parse error in header row")?,
        None => {
            warn!("registry is empty; no header row");
            return Ok(ParsedRegistry::default());
        }
    };

    let mut parsed = ParsedRegistry {
        header_len: header.len(),
        ..ParsedRegistry::default()
    };
    debug!(columns = parsed.header_len, "header read");

    for (idx, result) in rows.enumerate() {
        let row = result.with_context(|| format!("CSV parse error at data row {}", idx + 1))?;

        if row.len() != parsed.header_len {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            warn!(
                line,
                expected = parsed.header_len,
                found = row.len(),
                "row with unexpected number of columns; dropped"
            );
            parsed.dropped_rows += 1;
            continue;
        }

        let cells: Vec<&str> = row.iter().collect();
        parsed.records.push(schema::decode_row(&cells));
    }

    info!(
        kept = parsed.records.len(),
        dropped = parsed.dropped_rows,
        "registry parsed"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Condition;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,popdash::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const HEADER: &str = "data_cadastro;codigo_ibge;municipio;regiao;macrorregiao;sexo;\
tempo_morador_de_rua;faixa_etaria;raca_cor;frequencia_alimentacao;acesso_higiene;fumante;\
uso_alcool;outras_drogas;gestante;internacao_ult_12meses;prob_saude_mental;hipertenso;\
diabetico;doenca_respiratoria;tuberculose;tem_teve_cancer;possui_deficiencia;ultima_atualizacao";

    #[test]
    fn short_schema_example() -> Result<()> {
        init_test_logging();
        let parsed = parse_registry("h1;h2\n20230115;A\nbadrow\n20230216;B")?;

        assert_eq!(parsed.header_len, 2);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped_rows, 1);
        assert_eq!(
            parsed.records[0].registration_date.as_deref(),
            Some("15/01/2023")
        );
        assert_eq!(
            parsed.records[1].registration_date.as_deref(),
            Some("16/02/2023")
        );
        // column 1 is the IBGE code; "A" has no numeric prefix
        assert_eq!(parsed.records[0].ibge_code, None);
        Ok(())
    }

    #[test]
    fn full_schema_rows_keep_file_order() -> Result<()> {
        init_test_logging();
        let raw = format!(
            "{HEADER}\r\n\
20220301;5208707;GOIANIA;CENTRAL;CENTRO-OESTE;MASCULINO;1 a 5 anos;30 a 39 anos;PARDA;;;SIM;;;;;;SIM;;;;;;20240101\r\n\
20210710;5201405;APARECIDA DE GOIANIA;CENTRAL;CENTRO-OESTE;FEMININO;mais de 5 anos;18 a 29 anos;BRANCA;;;;;;;;SIM;;SIM;;;;;\r\n\
20210710;too;few;columns\r\n"
        );
        let parsed = parse_registry(&raw)?;

        assert_eq!(parsed.header_len, 24);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped_rows, 1);

        let first = &parsed.records[0];
        assert_eq!(first.municipality, "GOIANIA");
        assert_eq!(first.ibge_code, Some(5208707));
        assert!(first.has(Condition::Smoker));
        assert!(first.has(Condition::Hypertension));
        assert_eq!(first.last_update.as_deref(), Some("20240101"));

        let second = &parsed.records[1];
        assert_eq!(second.municipality, "APARECIDA DE GOIANIA");
        assert_eq!(second.registration_date.as_deref(), Some("10/07/2021"));
        assert!(second.has(Condition::MentalHealthIssue));
        assert!(second.has(Condition::Diabetes));
        assert!(!second.has(Condition::Hypertension));
        assert_eq!(second.last_update, None);
        Ok(())
    }

    #[test]
    fn retained_rows_always_match_header_width() -> Result<()> {
        let raw = "a;b;c\n1;2;3\n1;2\n1;2;3;4\n;;\n";
        let parsed = parse_registry(raw)?;
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped_rows, 2);
        Ok(())
    }

    #[test]
    fn lone_carriage_return_stays_inside_the_cell() -> Result<()> {
        let parsed = parse_registry("h1;h2;h3\n20230115;5208707;GOI\rANIA\n")?;
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped_rows, 0);
        assert_eq!(parsed.records[0].municipality, "GOI\rANIA");
        Ok(())
    }

    #[test]
    fn empty_input_yields_nothing() -> Result<()> {
        let parsed = parse_registry("")?;
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.dropped_rows, 0);
        Ok(())
    }
}
