//! Annotate and prompt command implementations.

use crate::cli::{AnnotateArgs, InputArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use celltyper_annotator::{
    delimiter_for_path, read_differential_table, read_gene_lists, Annotator, AnnotatorConfig,
    PROMPT_ONLY_NOTICE, VERIFY_REMINDER,
};
use celltyper_domain::{Annotation, AnnotationInput};
use celltyper_llm::{Credential, OpenAiProvider};
use std::fs::{self, File};
use std::io::BufReader;
use std::time::Duration;
use tracing::debug;

const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Execute the annotate command.
///
/// Without a credential this falls back to printing the prompt.
pub fn execute_annotate(args: AnnotateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let input = load_input(&args.input)?;
    let mut annotator_config = with_input_overrides(&config.annotator, &args.input);
    if let Some(max_attempts) = args.max_attempts {
        annotator_config = annotator_config.with_max_attempts(max_attempts);
    }
    if let Some(concurrency) = args.concurrency {
        annotator_config.concurrent_batches = concurrency;
    }
    annotator_config.validate().map_err(CliError::Config)?;

    let base_url = args.base_url.as_deref().unwrap_or(&config.llm.base_url);
    let model = args.model.as_deref().unwrap_or(&config.llm.model);

    // The blocking HTTP client has to be built and dropped outside the runtime
    let provider = match Credential::from_optional(args.api_key) {
        Some(credential) => {
            debug!("Using model '{}' at {}", model, base_url);
            Some(OpenAiProvider::new(
                base_url,
                model,
                credential,
                Duration::from_secs(config.llm.timeout_secs),
            )?)
        }
        None => {
            eprintln!("{}", formatter.notice(PROMPT_ONLY_NOTICE));
            None
        }
    };

    let annotator = Annotator::new(provider, annotator_config);
    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(annotator.annotate(&input, args.input.tissue.as_deref()));
    // Do not let a request still in flight hold up reporting the outcome
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    let annotation = outcome?;

    match annotation {
        Annotation::Prompt(prompt) => println!("{}", prompt),
        Annotation::Labels(labels) => {
            println!("{}", formatter.format_labels(&labels)?);
            if !labels.is_empty() {
                eprintln!("{}", formatter.notice(VERIFY_REMINDER));
            }
        }
    }

    Ok(())
}

/// Execute the prompt command.
pub fn execute_prompt(args: InputArgs, config: &Config) -> Result<()> {
    let input = load_input(&args)?;
    let annotator_config = with_input_overrides(&config.annotator, &args);
    annotator_config.validate().map_err(CliError::Config)?;

    let annotator: Annotator<OpenAiProvider> = Annotator::new(None, annotator_config);
    println!("{}", annotator.prompt_for(&input, args.tissue.as_deref())?);
    Ok(())
}

/// Read the table or marker lists named on the command line.
fn load_input(args: &InputArgs) -> Result<AnnotationInput> {
    if let Some(path) = &args.table {
        let delimiter = match args.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => {
                return Err(CliError::InvalidInput(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    c
                )))
            }
            None => delimiter_for_path(path),
        };
        let reader = BufReader::new(File::open(path)?);
        let rows = read_differential_table(reader, delimiter)?;
        debug!("Read {} rows from {}", rows.len(), path.display());
        return Ok(AnnotationInput::DifferentialTable(rows));
    }

    if let Some(path) = &args.markers {
        let lists = read_gene_lists(&fs::read_to_string(path)?)?;
        debug!("Read {} gene lists from {}", lists.len(), path.display());
        return Ok(AnnotationInput::GeneLists(lists));
    }

    Err(CliError::InvalidInput(
        "either --table or --markers is required".to_string(),
    ))
}

fn with_input_overrides(base: &AnnotatorConfig, args: &InputArgs) -> AnnotatorConfig {
    match args.top_genes {
        Some(top) => base.clone().with_top_gene_number(top),
        None => base.clone(),
    }
}
