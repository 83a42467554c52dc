use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dockhand::{
    exit_code_for_lifecycle_error, ContainerConfig, ContainerHandle, ContainerLifecycle,
    ContainerWaiter, DeletionRecord, DockerCli, Engine, HostConfig, ImageLifecycle,
    ImageReference, LifecycleError, RegistryTagChecker, Settings, WaitOptions,
};

mod cli;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let directive = if cli.verbose {
        Some("dockhand=debug".to_string())
    } else {
        cli.log.clone()
    };
    dockhand::telemetry::telemetry_init(directive.as_deref());

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dockhand: {e:#}");
            let code = e
                .downcast_ref::<LifecycleError>()
                .map(exit_code_for_lifecycle_error)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = Settings::from_env()?;
    if cli.docker.is_some() {
        settings.docker = cli.docker.clone();
    }
    if cli.registry.is_some() {
        settings.registry = cli.registry.clone();
    }
    let reference = |name: &str| match settings.registry.as_deref() {
        Some(reg) => ImageReference::with_registry(name, reg),
        None => ImageReference::new(name),
    };

    let command = match cli.command {
        // Registry lookups do not need the engine.
        Command::TagExists { name, api } => {
            let checker = RegistryTagChecker::from_settings(&settings)?.with_api(api);
            let found = checker.tag_exists(&reference(&name))?;
            println!("{}", if found { "yes" } else { "no" });
            return Ok(ExitCode::from(if found { 0 } else { 3 }));
        }
        other => other,
    };

    let engine: Arc<dyn Engine> = Arc::new(DockerCli::from_settings(&settings)?);
    let images = ImageLifecycle::new(Arc::clone(&engine));
    let containers = ContainerLifecycle::new(Arc::clone(&engine));

    match command {
        Command::TagExists { .. } => {}
        Command::Images { json } => {
            for img in images.list()? {
                if json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "id": img.id,
                            "repository": img.repository,
                            "tag": img.tag,
                            "created_at": img.created_at,
                            "size": img.size,
                        })
                    );
                } else {
                    println!(
                        "{}\t{}",
                        img.repo_tag().unwrap_or_else(|| "<none>".to_string()),
                        img.id
                    );
                }
            }
        }
        Command::Build { tag, file, context } => {
            let recipe = fs::read_to_string(&file)
                .with_context(|| format!("reading recipe {}", file.display()))?;
            images.build(&recipe, &context, &tag)?;
            println!("{tag}");
        }
        Command::Tag { source, target } => images.tag(&source, &target)?,
        Command::Pull { image } => images.pull(&reference(&image).full_name())?,
        Command::Push { image } => images.push(&reference(&image).full_name())?,
        Command::Rmi { image } => {
            for rec in images.delete(&reference(&image).full_name())? {
                match rec {
                    DeletionRecord::Untagged(r) => println!("Untagged: {r}"),
                    DeletionRecord::Deleted(id) => println!("Deleted: {id}"),
                }
            }
        }
        Command::Run {
            name,
            env,
            volumes,
            network,
            wait,
            image,
            cmd,
        } => {
            let mut config = ContainerConfig::default().with_cmd(cmd);
            config.env = env;
            let host = HostConfig {
                binds: volumes,
                network_mode: network,
                ..HostConfig::default()
            };
            let handle = containers.run(&reference(&image), &name, &config, Some(&host))?;
            if !wait {
                println!("{handle}");
                return Ok(ExitCode::SUCCESS);
            }
            let waiter = ContainerWaiter::with_options(
                Arc::clone(&engine),
                WaitOptions::from_settings(&settings),
            );
            waiter.wait_until_done(&handle)?;
            let exit = containers.inspect(&handle)?.state.exit_code;
            print!("{}", containers.fetch_logs(&handle)?);
            containers.remove_one(handle.as_str())?;
            return Ok(ExitCode::from(exit.clamp(0, 255) as u8));
        }
        Command::Wait { container, timeout } => {
            let mut options = WaitOptions::from_settings(&settings);
            if let Some(t) = timeout {
                options = options.timeout(t);
            }
            let handle = ContainerHandle::from(container);
            ContainerWaiter::with_options(Arc::clone(&engine), options)
                .wait_until_done(&handle)?;
            println!("{}", containers.status(&handle)?);
        }
        Command::Logs { container } => {
            print!("{}", containers.fetch_logs(&ContainerHandle::from(container))?);
        }
        Command::Rm { containers: ids } => containers.remove_many(&ids)?,
    }
    Ok(ExitCode::SUCCESS)
}
