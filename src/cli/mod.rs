//! Command dispatch and terminal output

pub mod args;

use std::fs;

use comfy_table::Table;
use uuid::Uuid;

use crate::auth::OAuth2Client;
use crate::backup;
use crate::errors::{ReqlabError, Result};
use crate::models::types::{Auth, AuthType, Environment, HttpResponse, Project, Token};
use crate::openapi::SpecFormat;
use crate::workspace::Workspace;

use args::{
    BackupCommand, Cli, Command, EnvCommand, GrantKind, HistoryCommand, ProjectCommand,
    RequestCommand, SpecFormatArg, TokenCommand,
};

pub async fn run(cli: Cli) -> Result<()> {
    let workspace = match &cli.data_dir {
        Some(dir) => Workspace::open(dir)?,
        None => Workspace::open_default()?,
    };

    match cli.command {
        Command::Send { id } => send(&workspace, &id).await,
        Command::Run { project_id } => run_collection(&workspace, &project_id).await,
        Command::History { command } => history(&workspace, command),
        Command::Env { command } => env(&workspace, command),
        Command::Project { command } => project(&workspace, command),
        Command::Request { command } => request(&workspace, command),
        Command::ImportOpenapi {
            file,
            project,
            format,
        } => {
            let content = fs::read_to_string(&file)?;
            let format = match format {
                Some(SpecFormatArg::Json) => SpecFormat::Json,
                Some(SpecFormatArg::Yaml) => SpecFormat::Yaml,
                None => SpecFormat::from_path(&file),
            };
            let imported = workspace.import_openapi(&content, format, &project)?;
            println!("Imported {} requests into project {project}", imported.len());
            for request in &imported {
                println!("  {} {} {}", request.id, request.method, request.url);
            }
            Ok(())
        }
        Command::Token { command } => token(&workspace, command).await,
        Command::Backup { command } => match command {
            BackupCommand::Export { out } => {
                let data = backup::export(&workspace)?;
                match out {
                    Some(path) => {
                        fs::write(&path, data)?;
                        println!("Backup written to {}", path.display());
                    }
                    None => println!("{data}"),
                }
                Ok(())
            }
            BackupCommand::Import { file } => {
                let content = fs::read_to_string(&file)?;
                let report = backup::import(&workspace, &content)?;
                println!(
                    "Imported {} projects, {} requests, {} environments, {} tokens, {} history entries",
                    report.projects,
                    report.requests,
                    report.environments,
                    report.tokens,
                    report.history
                );
                for warning in &report.warnings {
                    eprintln!("warning: {warning}");
                }
                Ok(())
            }
        },
    }
}

async fn send(workspace: &Workspace, id: &str) -> Result<()> {
    let request = workspace
        .requests
        .get(id)
        .ok_or_else(|| ReqlabError::Storage(format!("unknown request id: {id}")))?;
    let response = workspace.execute_request(&request).await?;
    print_response(&response);
    Ok(())
}

fn print_response(response: &HttpResponse) {
    println!(
        "{} ({} ms, {} bytes)",
        response.status_text, response.time_ms, response.size
    );
    if !response.body.is_empty() {
        println!("{}", response.body);
    }
    if let Some(script) = &response.script_result {
        for line in &script.console_output {
            eprintln!("[script] {line}");
        }
        for test in &script.tests {
            let mark = if test.passed { "PASS" } else { "FAIL" };
            match &test.error {
                Some(error) => eprintln!("[{mark}] {} ({error})", test.name),
                None => eprintln!("[{mark}] {}", test.name),
            }
        }
        if let Some(error) = &script.error {
            eprintln!("{error}");
        }
    }
}

async fn run_collection(workspace: &Workspace, project_id: &str) -> Result<()> {
    let result = workspace.run_collection(project_id).await?;

    let mut table = Table::new();
    table.set_header(vec!["Request", "Method", "Status", "Time", "Tests", "Result"]);
    for entry in &result.request_results {
        let status = match &entry.error {
            Some(error) => error.clone(),
            None => entry.status_text.clone(),
        };
        let outcome = if entry.error.is_some() {
            "error"
        } else if entry.success && entry.failed_tests == 0 {
            "ok"
        } else {
            "failed"
        };
        table.add_row(vec![
            entry.request_name.clone(),
            entry.method.clone(),
            status,
            format!("{} ms", entry.duration),
            format!("{}/{}", entry.passed_tests, entry.tests.len()),
            outcome.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "{}: {} requests in {} ms, tests {} passed / {} failed",
        result.project_name,
        result.request_results.len(),
        result.duration,
        result.passed_tests,
        result.failed_tests
    );
    Ok(())
}

fn history(workspace: &Workspace, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { limit } => {
            print_history(&workspace.history.list(limit));
            Ok(())
        }
        HistoryCommand::Search { query } => {
            print_history(&workspace.history.search(&query));
            Ok(())
        }
        HistoryCommand::Delete { id } => workspace.history.delete(&id),
        HistoryCommand::Clear => workspace.history.clear(),
    }
}

fn print_history(records: &[crate::models::types::HistoryRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["Id", "When", "Method", "Status", "URL"]);
    for record in records {
        table.add_row(vec![
            record.id.clone(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.request.method.to_string(),
            record.response.status.to_string(),
            record.request.url.clone(),
        ]);
    }
    println!("{table}");
}

fn env(workspace: &Workspace, command: EnvCommand) -> Result<()> {
    match command {
        EnvCommand::List => {
            let active = workspace.environments.active_id();
            let mut table = Table::new();
            table.set_header(vec!["Id", "Name", "Variables", "Active"]);
            for env in workspace.environments.list() {
                let is_active = active.as_deref() == Some(env.id.as_str());
                table.add_row(vec![
                    env.id,
                    env.name,
                    env.variables.len().to_string(),
                    if is_active { "*".to_string() } else { String::new() },
                ]);
            }
            println!("{table}");
            Ok(())
        }
        EnvCommand::Create { name } => {
            let env = Environment {
                id: Uuid::new_v4().to_string(),
                name,
                ..Default::default()
            };
            println!("{}", env.id);
            workspace.environments.save(env)
        }
        EnvCommand::Use { id } => {
            if workspace.environments.get(&id).is_none() {
                return Err(ReqlabError::Storage(format!("unknown environment id: {id}")));
            }
            workspace.environments.set_active(Some(&id))
        }
        EnvCommand::Set { id, key, value } => {
            let mut env = workspace
                .environments
                .get(&id)
                .ok_or_else(|| ReqlabError::Storage(format!("unknown environment id: {id}")))?;
            env.variables.insert(key, value);
            workspace.environments.save(env)
        }
        EnvCommand::Delete { id } => workspace.environments.delete(&id),
    }
}

fn project(workspace: &Workspace, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::List => {
            let mut table = Table::new();
            table.set_header(vec!["Id", "Name", "Base URL", "Updated"]);
            for project in workspace.projects.list() {
                table.add_row(vec![
                    project.id,
                    project.name,
                    project.base_url,
                    project.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        ProjectCommand::Create {
            name,
            description,
            base_url,
        } => {
            let project = Project {
                id: Uuid::new_v4().to_string(),
                name,
                description,
                base_url,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            };
            println!("{}", project.id);
            workspace.projects.create(project)
        }
        ProjectCommand::Delete { id } => workspace.projects.delete(&id),
    }
}

fn request(workspace: &Workspace, command: RequestCommand) -> Result<()> {
    match command {
        RequestCommand::List { project } => {
            let requests = match project {
                Some(project_id) => workspace.requests.for_project(&project_id),
                None => workspace.requests.list(),
            };
            let mut table = Table::new();
            table.set_header(vec!["Id", "Name", "Method", "URL", "Project"]);
            for request in requests {
                table.add_row(vec![
                    request.id,
                    request.name,
                    request.method.to_string(),
                    request.url,
                    request.project_id,
                ]);
            }
            println!("{table}");
            Ok(())
        }
        RequestCommand::Delete { id } => workspace.requests.delete(&id),
        RequestCommand::Export { project_id } => {
            println!("{}", workspace.requests.export_project(&project_id)?);
            Ok(())
        }
        RequestCommand::Import { project_id, file } => {
            let content = fs::read_to_string(&file)?;
            let count = workspace.requests.import_project(&project_id, &content)?;
            println!("Imported {count} requests into project {project_id}");
            Ok(())
        }
    }
}

async fn token(workspace: &Workspace, command: TokenCommand) -> Result<()> {
    match command {
        TokenCommand::List => {
            let mut table = Table::new();
            table.set_header(vec!["Id", "Name", "Header", "Updated"]);
            for token in workspace.tokens.list() {
                table.add_row(vec![
                    token.id,
                    token.name,
                    token.header_key,
                    token.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        TokenCommand::Save {
            name,
            value,
            header,
        } => {
            let token = Token {
                id: Uuid::new_v4().to_string(),
                name,
                value,
                header_key: header,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            };
            println!("{}", token.id);
            workspace.tokens.save(token)
        }
        TokenCommand::Delete { id } => workspace.tokens.delete(&id),
        TokenCommand::Fetch {
            name,
            grant,
            token_url,
            client_id,
            client_secret,
            scope,
            username,
            password,
            refresh_token,
        } => {
            let auth = Auth {
                auth_type: AuthType::OAuth2,
                username,
                password,
                oauth2_token_url: token_url,
                oauth2_client_id: client_id,
                oauth2_client_secret: client_secret,
                oauth2_scope: scope,
                oauth2_refresh_token: refresh_token,
                ..Default::default()
            };
            let client = OAuth2Client::new()?;
            let response = match grant {
                GrantKind::ClientCredentials => client.client_credentials(&auth).await?,
                GrantKind::Password => client.password(&auth).await?,
                GrantKind::Refresh => client.refresh(&auth).await?,
            };
            let token = Token {
                id: Uuid::new_v4().to_string(),
                name,
                value: response.access_token.clone(),
                header_key: "Authorization".into(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            };
            println!("{}", token.id);
            workspace.tokens.save(token)
        }
    }
}
