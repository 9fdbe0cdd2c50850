use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use wvs_align::config::{ExtractorConfig, Language, CROSS_DATASET_THRESHOLD, LOOKUP_THRESHOLD};
use wvs_align::global::{load_global_opinions, match_global_opinions, write_global_matches};
use wvs_align::microdata::Microdata;
use wvs_align::parse::extract_text_from_pdf;
use wvs_align::persona::{group_personas, write_personas};
use wvs_align::table::{read_mappings, write_inconsistencies, write_mappings};
use wvs_align::tabulate::{tabulate, write_tabulation};
use wvs_align::{closest_questions, lookup_question, map_questionnaires, persona_responses};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Extract, align and tabulate World Values Survey questionnaires for Turkey.",
    arg_required_else_help = true
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Log every pipeline step, not just the summaries
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Directory for a persistent log file
    #[clap(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract questions from both questionnaires and align them by position
    Extract {
        #[clap(long, default_value = "data/F00009572-WVS7_Questionnaire_Turkey_2018_Turkish.pdf")]
        turkish_pdf: PathBuf,

        #[clap(
            long,
            default_value = "data/F00010738-WVS-7_Master_Questionnaire_2017-2020_English.pdf"
        )]
        english_pdf: PathBuf,

        #[clap(short, long, default_value = "results/survey_question_mapping.csv")]
        output: PathBuf,

        #[clap(long, default_value = "results/inconsistencies_review.csv")]
        inconsistencies: PathBuf,

        /// JSON file overriding the label vocabulary, exclusion markers or sentinels
        #[clap(long)]
        config: Option<PathBuf>,

        /// Label written for code -1 in the Turkish questionnaire
        #[clap(long, default_value = "Fikri Yok")]
        turkish_no_opinion: String,

        /// Label written for code -2 in the Turkish questionnaire
        #[clap(long, default_value = "Cevap Yok")]
        turkish_no_answer: String,
    },

    /// Find the mapped question closest to a free-text query
    Lookup {
        query: String,

        #[clap(long, default_value = "results/survey_question_mapping.csv")]
        mapping: PathBuf,

        #[clap(long, value_enum, default_value_t = LanguageArg::English)]
        language: LanguageArg,

        #[clap(long, default_value_t = LOOKUP_THRESHOLD)]
        threshold: f64,
    },

    /// Answer distribution for a question among respondents matching a persona description
    Distribution {
        /// Turkish persona description, e.g. "Ayşe, 49 yaşında evli bir kadın, ..."
        persona: String,

        /// Question text, matched against the mapping
        question: String,

        #[clap(long, default_value = "results/survey_question_mapping.csv")]
        mapping: PathBuf,

        #[clap(long, default_value = "data/F00013167-WVS_Wave_7_Turkey_Csv_v5.0.csv")]
        microdata: PathBuf,

        #[clap(long, value_enum, default_value_t = LanguageArg::Turkish)]
        language: LanguageArg,

        #[clap(long, default_value_t = LOOKUP_THRESHOLD)]
        threshold: f64,
    },

    /// Join survey questions to the global opinions dataset
    MatchGlobal {
        #[clap(long, default_value = "results/survey_question_mapping.csv")]
        mapping: PathBuf,

        #[clap(long, default_value = "data/data_global_opinions.csv")]
        global: PathBuf,

        #[clap(short, long, default_value = "results/matched_survey_global_data.csv")]
        output: PathBuf,

        #[clap(long, default_value = "Turkey")]
        country: String,

        #[clap(long, default_value_t = CROSS_DATASET_THRESHOLD)]
        threshold: f64,
    },

    /// Count respondents per demographic persona and describe each one
    Personas {
        #[clap(long, default_value = "data/F00013167-WVS_Wave_7_Turkey_Csv_v5.0.csv")]
        microdata: PathBuf,

        #[clap(short, long, default_value = "results/persona_counts_with_prompts_tr.csv")]
        output: PathBuf,
    },

    /// Response percentages per question, overall and by demographic slice
    Tabulate {
        #[clap(long, default_value = "data/F00013167-WVS_Wave_7_Turkey_Csv_v5.0.csv")]
        microdata: PathBuf,

        #[clap(long, default_value = "results/survey_question_mapping.csv")]
        mapping: PathBuf,

        #[clap(
            short,
            long,
            default_value = "final_survey_results_with_gender_age_marital_children.csv"
        )]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LanguageArg {
    Turkish,
    English,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Turkish => Language::Turkish,
            LanguageArg::English => Language::English,
        }
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn main() -> Result<()> {
    let args = Args::parse_args();

    let _guard = wvs_align::logging::init_logging(args.verbose, args.log_dir.map(|d| expand(&d)));

    match args.command {
        Command::Extract {
            turkish_pdf,
            english_pdf,
            output,
            inconsistencies,
            config,
            turkish_no_opinion,
            turkish_no_answer,
        } => {
            let base = match config {
                Some(path) => ExtractorConfig::load(expand(&path))?,
                None => ExtractorConfig::default(),
            };
            let turkish_config = base
                .clone()
                .with_sentinels(&turkish_no_opinion, &turkish_no_answer);

            let turkish_text = extract_text_from_pdf(expand(&turkish_pdf));
            let english_text = extract_text_from_pdf(expand(&english_pdf));

            let mapping = map_questionnaires(&turkish_text, &english_text, turkish_config, base);

            write_mappings(&expand(&output), &mapping.alignment.mappings)?;
            write_inconsistencies(&expand(&inconsistencies), &mapping.inconsistencies)?;
            info!(
                "Extraction and mapping completed. Check {} and {} for details.",
                output.display(),
                inconsistencies.display()
            );
        }
        Command::Lookup {
            query,
            mapping,
            language,
            threshold,
        } => {
            let mappings = read_mappings(&expand(&mapping))?;
            match lookup_question(&mappings, &query, language.into(), threshold) {
                Some((row, best)) => println!(
                    "{}\t{}\t{:.3}\t{}",
                    row.english.question_id, row.turkish.question_id, best.score, row.english.question_text
                ),
                None => {
                    warn!("No question matched {query:?} at threshold {threshold}");
                    for (row, near) in closest_questions(&mappings, &query, language.into(), 3) {
                        info!(
                            "Nearest: {} ({:.3}) {}",
                            row.english.question_id, near.score, row.english.question_text
                        );
                    }
                }
            }
        }
        Command::Distribution {
            persona,
            question,
            mapping,
            microdata,
            language,
            threshold,
        } => {
            let mappings = read_mappings(&expand(&mapping))?;
            let data = Microdata::load(&expand(&microdata))?;

            let Some(result) =
                persona_responses(&mappings, &data, &persona, &question, language.into(), threshold)?
            else {
                warn!("No question matched {question:?} at threshold {threshold}");
                return Ok(());
            };

            if result.features.is_empty() {
                info!("No persona attributes recognized; using every respondent");
            } else {
                info!("Persona attributes: {:?}", result.features);
            }
            if result.distribution.respondents == 0 {
                warn!("No respondents match this persona");
                return Ok(());
            }

            let turkish = &result.mapping.turkish;
            println!(
                "{}\t{:.3}\t{}",
                turkish.question_id, result.question_match.score, turkish.question_text
            );
            println!("Respondents: {}", result.distribution.respondents);
            for (code, share) in &result.distribution.shares {
                let label = usize::try_from(*code - 1)
                    .ok()
                    .and_then(|idx| turkish.response_options.get(idx))
                    .map(String::as_str)
                    .unwrap_or("");
                println!("{code}\t{label}\t{share:.2}%");
            }
        }
        Command::MatchGlobal {
            mapping,
            global,
            output,
            country,
            threshold,
        } => {
            let mappings = read_mappings(&expand(&mapping))?;
            let opinions = load_global_opinions(&expand(&global))?;
            let matches = match_global_opinions(&mappings, &opinions, &country, threshold);
            write_global_matches(&expand(&output), &matches)?;
        }
        Command::Personas { microdata, output } => {
            let data = Microdata::load(&expand(&microdata))?;
            let personas = group_personas(&data)?;
            write_personas(&expand(&output), &personas)?;
        }
        Command::Tabulate {
            microdata,
            mapping,
            output,
        } => {
            let data = Microdata::load(&expand(&microdata))?;
            let mappings = read_mappings(&expand(&mapping))?;
            let rows = tabulate(&data, &mappings);
            write_tabulation(&expand(&output), &rows)?;
        }
    }

    Ok(())
}
