use crate::{BuildArgs, build::BuildParameters, site::Site};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let root = if args.site.is_relative() {
        std::env::current_dir()?.join(&args.site)
    } else {
        args.site.clone()
    };

    if !root.is_dir() {
        return Err(anyhow::anyhow!(
            "Site directory does not exist: {path}",
            path = root.display()
        ));
    }

    let params = BuildParameters {
        extra_config: args.extra_config.clone(),
        output_dir: args.output.clone(),
    };
    let site = Site::new(root, params);
    println!("Building site '{}'", site.name());

    // Rendering is blocking file I/O from start to finish
    let result = tokio::task::spawn_blocking(move || site.build()).await??;

    println!(
        "Built site to {} ({} pages, {} templates, {} partials, {} asset files)",
        result.output_dir.display(),
        result.pages,
        result.templates,
        result.partials,
        result.assets
    );

    Ok(())
}
