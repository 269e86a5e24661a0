use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> anyhow::Result<()> {
    // migrations are embedded into the binary
    println!("cargo:rerun-if-changed=migrations");

    let gitcl = GitclBuilder::default().branch(true).sha(true).build()?;
    Emitter::default().add_instructions(&gitcl)?.emit()?;

    Ok(())
}
