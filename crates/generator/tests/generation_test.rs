//! Output generation from converted documents

use oas2smithy_common::Model;
use oas2smithy_converter::{Converter, OpenApiParser};
use oas2smithy_generator::{generate, generate_to_file, IdlGenerator, JsonAstSerializer, OutputFormat};
use serde_json::Value;
use tempfile::TempDir;

const PETS: &str = r##"{
    "openapi": "3.0.0",
    "info": {"title": "Pets", "version": "1.0"},
    "paths": {
        "/pets/{petId}": {
            "get": {
                "operationId": "getPet",
                "parameters": [
                    {"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}
                ],
                "responses": {
                    "200": {
                        "description": "the pet",
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    }
                }
            }
        }
    },
    "components": {
        "schemas": {
            "Pet": {
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string"}}
            }
        }
    }
}"##;

fn model() -> Model {
    let parser = OpenApiParser::from_json(PETS).unwrap();
    Converter::new().convert(parser.document()).unwrap()
}

#[test]
fn test_json_ast() {
    let value = JsonAstSerializer::new().to_value(&model());

    assert_eq!(value["smithy"], "1.0");
    let shapes = value["shapes"].as_object().unwrap();
    assert!(!shapes.keys().any(|id| id.starts_with("smithy.api#")));

    let get_pet = &shapes["ns.foo#getPet"];
    assert_eq!(get_pet["type"], "operation");
    assert_eq!(get_pet["input"]["target"], "ns.foo#getPetInput");
    assert_eq!(get_pet["traits"]["smithy.api#http"]["method"], "GET");
    assert_eq!(get_pet["traits"]["smithy.api#http"]["code"], 200);
    assert_eq!(get_pet["traits"]["smithy.api#readonly"], Value::Object(Default::default()));

    let resource = &shapes["ns.foo#ResourcePets"];
    assert_eq!(resource["identifiers"]["petId"]["target"], "smithy.api#String");
    assert_eq!(resource["read"]["target"], "ns.foo#getPet");

    let service = &shapes["ns.foo#TestService"];
    assert_eq!(service["version"], "1.0");
    assert_eq!(service["resources"][0]["target"], "ns.foo#ResourcePets");
}

#[test]
fn test_json_ast_is_valid_json_text() {
    let text = generate(&model(), OutputFormat::Json).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, JsonAstSerializer::new().to_value(&model()));
}

#[test]
fn test_idl() {
    let idl = IdlGenerator::new().unwrap().generate(&model()).unwrap();

    assert!(idl.starts_with("$version: \"1.0\"\n\nnamespace ns.foo\n"));
    assert!(idl.contains("structure Pet {\n    @required\n    name: String,\n}"));
    assert!(idl.contains(
        "@http(method: \"GET\", uri: \"/pets/{petId}\", code: 200)\n@readonly\noperation getPet {\n    input: getPetInput,\n    output: getPetOutput,\n}"
    ));
    assert!(idl.contains("    @httpLabel\n    @required\n    petId: String,"));
    assert!(idl.contains("resource ResourcePets {\n    identifiers: { petId: String },\n    read: getPet,\n}"));
    assert!(idl.contains("@title(\"Pets\")\nservice TestService {\n    version: \"1.0\",\n    resources: [ResourcePets],\n}"));
}

#[test]
fn test_generate_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("model").join("pets.smithy");

    generate_to_file(&model(), OutputFormat::Idl, &output).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("namespace ns.foo"));
}
