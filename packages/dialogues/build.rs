use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("dialogues.rs");

    let mut entries: Vec<(String, String)> = Vec::new();
    let scripts_dir = Path::new("scripts");

    if scripts_dir.exists() {
        for entry in WalkDir::new(scripts_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "txt"))
        {
            let path = entry.path();
            // The dialogue id is the file stem: scripts/at_the_cafe.txt -> at_the_cafe
            let id = path.file_stem().unwrap().to_string_lossy().into_owned();

            if let Ok(content) = fs::read_to_string(path) {
                entries.push((id, content));
            }
        }
    }

    let mut code = String::new();
    code.push_str("/// Embedded dialogue scripts as (id, script) pairs, sorted by id\n");
    code.push_str("pub static DIALOGUES: &[(&str, &str)] = &[\n");
    for (id, content) in &entries {
        code.push_str(&format!("    ({:?}, {:?}),\n", id, content));
    }
    code.push_str("];\n");

    fs::write(&dest_path, code).unwrap();

    println!("cargo:rerun-if-changed=scripts");
}
