//! # Template Commands
//!
//! ```text
//! cashplan templates list
//! cashplan templates get <ID>
//! cashplan templates add <NAME> <SALARY> [--rank R] [--department D]
//! cashplan templates delete <ID>
//! ```

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use cashplan_core::{NewTemplate, SalaryTemplate};
use cashplan_db::Database;

#[derive(Args, Debug, Clone)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TemplatesCommand {
    /// Ordered by name.
    List,
    Get {
        id: String,
    },
    Add {
        name: String,
        salary: i64,
        #[arg(long, default_value = "")]
        rank: String,
        #[arg(long, default_value = "")]
        department: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TemplatesOutput {
    List { templates: Vec<SalaryTemplate> },
    Template(SalaryTemplate),
    Deleted { deleted: String },
}

pub async fn run(db: &Database, args: TemplatesArgs) -> AppResult<TemplatesOutput> {
    let repo = db.templates();

    match args.command {
        TemplatesCommand::List => Ok(TemplatesOutput::List {
            templates: repo.list().await?,
        }),
        TemplatesCommand::Get { id } => repo
            .get(&id)
            .await?
            .map(TemplatesOutput::Template)
            .ok_or_else(|| AppError::not_found("Template", &id)),
        TemplatesCommand::Add {
            name,
            salary,
            rank,
            department,
        } => {
            let template = repo
                .create(&NewTemplate::new(&name, &rank, &department, salary))
                .await?;
            Ok(TemplatesOutput::Template(template))
        }
        TemplatesCommand::Delete { id } => {
            repo.delete(&id).await?;
            Ok(TemplatesOutput::Deleted { deleted: id })
        }
    }
}
