use strum_macros::{Display, EnumIter, EnumString};

use quill::errors::ToolResult;
use quill::generator::ReportOptions;
use quill::models::generation::GenerationRequest;
use quill::models::message::Message;
use quill::providers::factory::ProviderType;
use quill::tools::{add_numbers, add_numbers_tool, ToolRegistry};

const LLAMA: &str = "llama-3.3-70b-versatile";
const COMPOUND: &str = "compound-beta";
const GEMINI: &str = "gemini-2.5-flash";

const SUMMIT_QUESTION: &str =
    "When was the AI engineer summit 2025, and what impact has it had in the world of AI";

/// The built-in reports, each a fixed prompt against a fixed model
#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum Report {
    ExplainAtmosphere,
    Summit,
    CompoundBeta,
    GoogleSearchGrounding,
    SummitCompound,
    SummitGrounding,
    FunctionCalling,
}

pub struct ReportPlan {
    pub provider: ProviderType,
    pub request: GenerationRequest,
    pub options: ReportOptions,
}

impl Report {
    pub fn description(&self) -> &'static str {
        match self {
            Report::ExplainAtmosphere => "Explain the atmosphere in gangsta rap style (groq llama)",
            Report::Summit => "Ask groq llama when the AI engineer summit 2025 was",
            Report::CompoundBeta => "Key points of a current event via groq compound-beta web search",
            Report::GoogleSearchGrounding => "High profile web2/web3 hacks with Gemini search grounding, saved",
            Report::SummitCompound => "AI engineer summit impact via groq compound-beta",
            Report::SummitGrounding => "AI engineer summit impact via Gemini search grounding, saved",
            Report::FunctionCalling => "Gemini calling the add_numbers tool",
        }
    }

    pub fn plan(&self) -> ToolResult<ReportPlan> {
        let function_name = self.to_string().replace('-', "_");
        let options = ReportOptions::new(function_name);

        let plan = match self {
            Report::ExplainAtmosphere => ReportPlan {
                provider: ProviderType::Groq,
                request: GenerationRequest::new(
                    LLAMA,
                    "Explain what is atmosphere, in gangsta rap style",
                ),
                options: options.with_heading("🔥 Atmosphere, Gangsta Style:"),
            },
            Report::Summit => ReportPlan {
                provider: ProviderType::Groq,
                request: GenerationRequest::new(
                    LLAMA,
                    vec![Message::user("When was the AI engineer summit 2025")],
                ),
                options: options
                    .with_heading("Generated answer:")
                    .with_title(format!("groq({})", LLAMA)),
            },
            Report::CompoundBeta => ReportPlan {
                provider: ProviderType::Groq,
                request: GenerationRequest::new(
                    COMPOUND,
                    vec![Message::user(
                        "Explain the key points of the Iran-Israel War as of June 2025",
                    )],
                ),
                options: options.with_heading("🌐 Compound Beta, with web search:"),
            },
            Report::GoogleSearchGrounding => ReportPlan {
                provider: ProviderType::Google,
                request: GenerationRequest::new(
                    GEMINI,
                    vec![Message::user(
                        "Explain high profile hacks web 2 and web 3 as of 2025",
                    )],
                )
                .with_search_grounding(),
                options: options
                    .with_heading("🔎 Gemini, grounded in Google Search:")
                    .with_model_label(GEMINI)
                    .saved(),
            },
            Report::SummitCompound => ReportPlan {
                provider: ProviderType::Groq,
                request: GenerationRequest::new(COMPOUND, vec![Message::user(SUMMIT_QUESTION)]),
                options: options
                    .with_header("AI engineer summit, compound-beta", "summit_compound")
                    .with_title(format!("groq({})", COMPOUND)),
            },
            Report::SummitGrounding => {
                let label = format!("google({}) - Search Grounding", GEMINI);
                ReportPlan {
                    provider: ProviderType::Google,
                    request: GenerationRequest::new(GEMINI, vec![Message::user(SUMMIT_QUESTION)])
                        .with_search_grounding(),
                    options: options
                        .with_header("Google Gemini with Search grounding", "summit_grounding")
                        .with_title(label.as_str())
                        .with_model_label(label.as_str())
                        .saved(),
                }
            }
            Report::FunctionCalling => {
                let tools = ToolRegistry::new().with_tool(add_numbers_tool(), add_numbers)?;
                ReportPlan {
                    provider: ProviderType::Google,
                    request: GenerationRequest::new(GEMINI, "What is 2000 + 3000").with_tools(tools),
                    options: options
                        .with_header("Function calling", "function_calling")
                        .with_title(format!("google({}) - Function calling", GEMINI)),
                }
            }
        };

        Ok(plan)
    }
}
