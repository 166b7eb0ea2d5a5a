use crate::{CreateArgs, build::BuildParameters, site::Site};

pub async fn run(args: &CreateArgs) -> Result<(), anyhow::Error> {
    let root = if args.site.is_relative() {
        std::env::current_dir()?.join(&args.site)
    } else {
        args.site.clone()
    };

    println!("Creating site in {}", root.display());

    let root = Site::new(root, BuildParameters::default()).create().await?;

    println!(
        "Created site {path}; build it with `tacho build {path}`",
        path = root.display()
    );

    Ok(())
}
