//! [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed structured data hashing.
//!
//! Documents arrive as untrusted JSON and are parsed in two stages: the text is first parsed
//! as JSON ([`Eip712Error::Json`]), then the value is validated against the typed-data schema
//! ([`Eip712Error::Invalid`]). Hashing follows MetaMask's `eth-sig-util` dialects selected by
//! [`TypedDataVersion`].
use super::primitive::Primitive;
use crate::{
    shape,
    types::{Address, H256, U256},
    utils::{keccak256, keccak256_concat, to_checksum},
    validation::{
        address, array, array_of, field, hex_bytes, numeric, object, optional, record, shape,
        string, ValidationError,
    },
};
use ethabi::{encode, Token};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Custom types for `TypedData`
pub type Types = BTreeMap<String, Vec<Eip712DomainType>>;

/// Name of the domain struct type
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// An EIP-712 error.
#[derive(Debug, Error)]
pub enum Eip712Error {
    /// The document is not valid JSON text
    #[error("typed data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is JSON but does not have the typed-data shape
    #[error("invalid typed data: {0}")]
    Invalid(#[from] ValidationError),
    #[error("no type definition found for `{0}`")]
    UndefinedType(String),
    #[error("unsupported field type `{0}`")]
    UnsupportedType(String),
    #[error("no data found for `{0}`")]
    MissingValue(String),
    #[error("invalid value for `{field}`: {source}")]
    InvalidValue { field: String, source: ValidationError },
    #[error("Arrays are unimplemented in encodeData; use V4 extension")]
    ArraysRequireV4,
}

/// The `encodeData` dialect used when hashing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedDataVersion {
    /// `eth_signTypedData_v3`: absent fields are skipped, arrays are rejected
    V3,
    /// `eth_signTypedData_v4`: absent struct fields hash to zero, arrays are supported
    V4,
}

/// The two hashes a typed-data signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDataHashes {
    pub domain_separator: H256,
    /// `None` when the primary type is the domain itself
    pub struct_hash: Option<H256>,
}

impl TypedDataHashes {
    /// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`
    pub fn digest(&self) -> H256 {
        let struct_hash = self.struct_hash.as_ref().map(H256::as_bytes).unwrap_or_default();
        H256(keccak256_concat([&[0x19, 0x01][..], self.domain_separator.as_bytes(), struct_hash]))
    }
}

/// Eip712 Domain attributes used in determining the domain separator.
///
/// Protocol designers only need to include the fields that make sense for their signing domain.
/// Unused fields are left out of the struct type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EIP712Domain {
    ///  The user readable name of signing domain, i.e. the name of the DApp or the protocol.
    pub name: Option<String>,

    /// The current major version of the signing domain. Signatures from different versions are not
    /// compatible.
    pub version: Option<String>,

    /// The EIP-155 chain id. The user-agent should refuse signing if it does not match the
    /// currently active chain.
    pub chain_id: Option<U256>,

    /// The address of the contract that will verify the signature.
    pub verifying_contract: Option<Address>,

    /// A disambiguating salt for the protocol. This can be used as a domain separator of last
    /// resort.
    pub salt: Option<[u8; 32]>,
}

impl EIP712Domain {
    /// Parses a `domain` object. Unknown keys are ignored, `null` counts as absent.
    #[allow(non_snake_case)]
    pub fn parse(input: &Value) -> Result<Self, ValidationError> {
        let obj = object(input)?;
        let (name, version, chain_id, verifying_contract, salt) = shape! {
            name: optional(obj, "name", string),
            version: optional(obj, "version", string),
            chainId: optional(obj, "chainId", numeric),
            verifyingContract: optional(obj, "verifyingContract", address),
            salt: optional(obj, "salt", parse_salt),
        }?;
        Ok(Self {
            name: name.map(str::to_owned),
            version: version.map(str::to_owned),
            chain_id,
            verifying_contract,
            salt,
        })
    }

    /// Computes the domain separator over
    /// `EIP712Domain(string name,string version,uint256 chainId,address verifyingContract,bytes32 salt)`
    /// restricted to the fields that are present.
    ///
    /// A document's declared `types.EIP712Domain` is not consulted. Devices that are handed the
    /// whole document (Trezor) hash the domain against that declaration instead, so a document
    /// whose declaration lists other fields, or the same fields in another order, signs a
    /// different digest there.
    pub fn separator(&self) -> [u8; 32] {
        let mut fields = Vec::new();
        let mut tokens = Vec::new();
        if let Some(ref name) = self.name {
            fields.push("string name");
            tokens.push(Token::Uint(U256::from(keccak256(name))));
        }
        if let Some(ref version) = self.version {
            fields.push("string version");
            tokens.push(Token::Uint(U256::from(keccak256(version))));
        }
        if let Some(chain_id) = self.chain_id {
            fields.push("uint256 chainId");
            tokens.push(Token::Uint(chain_id));
        }
        if let Some(verifying_contract) = self.verifying_contract {
            fields.push("address verifyingContract");
            tokens.push(Token::Address(verifying_contract));
        }
        if let Some(salt) = self.salt {
            fields.push("bytes32 salt");
            tokens.push(Token::FixedBytes(salt.to_vec()));
        }

        let ty = format!("{EIP712_DOMAIN}({})", fields.join(","));
        tokens.insert(0, Token::Uint(U256::from(keccak256(ty))));
        keccak256(encode(&tokens))
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(ref name) = self.name {
            obj.insert("name".into(), name.clone().into());
        }
        if let Some(ref version) = self.version {
            obj.insert("version".into(), version.clone().into());
        }
        if let Some(chain_id) = self.chain_id {
            let chain_id = if chain_id <= U256::from(u64::MAX) {
                json!(chain_id.as_u64())
            } else {
                json!(chain_id.to_string())
            };
            obj.insert("chainId".into(), chain_id);
        }
        if let Some(ref verifying_contract) = self.verifying_contract {
            obj.insert("verifyingContract".into(), to_checksum(verifying_contract).into());
        }
        if let Some(salt) = self.salt {
            obj.insert("salt".into(), format!("0x{}", hex::encode(salt)).into());
        }
        Value::Object(obj)
    }
}

fn parse_salt(input: &Value) -> Result<[u8; 32], ValidationError> {
    let bytes = hex_bytes(input)?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| ValidationError::mismatch("32-byte salt", input))
}

/// Represents the name and type pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712DomainType {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl Eip712DomainType {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), r#type: ty.into() }
    }

    fn parse(input: &Value) -> Result<Self, ValidationError> {
        let obj = object(input)?;
        let fields = shape([
            ("name", field(obj, "name").and_then(string)),
            ("type", field(obj, "type").and_then(string)),
        ])
        .map_err(|errors| {
            ValidationError::Shape(errors.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
        })?;
        Ok(Self::new(fields["name"], fields["type"]))
    }
}

/// Represents the [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed data object.
///
/// ```json
/// {
///   "types": { "EIP712Domain": [ { "name": "...", "type": "..." } ], "...": [] },
///   "primaryType": "...",
///   "domain": { },
///   "message": { }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    /// Signing domain metadata. The signing domain is the intended context for the signature (e.g.
    /// the dapp, protocol, etc. that it's intended for). This data is used to construct the domain
    /// separator of the message.
    pub domain: EIP712Domain,
    /// The custom types used by this message.
    pub types: Types,
    /// The type of the message.
    pub primary_type: String,
    /// The message to be signed.
    pub message: Map<String, Value>,
}

impl TypedData {
    /// Parses a document received as JSON text.
    ///
    /// ethers.js and some dapps JSON-stringify the document a second time, so a JSON string
    /// whose content is itself JSON is unwrapped once.
    pub fn from_json_str(document: &str) -> Result<Self, Eip712Error> {
        let value = match serde_json::from_str(document)? {
            Value::String(inner) => serde_json::from_str(&inner)?,
            value => value,
        };
        Ok(Self::parse(&value)?)
    }

    /// Validates an already parsed document
    #[allow(non_snake_case)]
    pub fn parse(input: &Value) -> Result<Self, ValidationError> {
        let obj = object(input)?;
        let (types, primary_type, domain, message) = shape! {
            types: field(obj, "types").and_then(|types| {
                record(types, |fields| array_of(fields, Eip712DomainType::parse))
            }),
            primaryType: field(obj, "primaryType").and_then(string),
            domain: field(obj, "domain").and_then(EIP712Domain::parse),
            message: field(obj, "message").and_then(object),
        }?;
        Ok(Self {
            domain,
            types,
            primary_type: primary_type.to_owned(),
            message: message.clone(),
        })
    }

    /// Reproduces the document, for devices that hash it themselves
    pub fn to_value(&self) -> Value {
        json!({
            "types": self.types,
            "primaryType": self.primary_type,
            "domain": self.domain.to_value(),
            "message": self.message,
        })
    }

    /// `hashStruct(message)` under `version`
    pub fn struct_hash(&self, version: TypedDataVersion) -> Result<[u8; 32], Eip712Error> {
        let data = Value::Object(self.message.clone());
        hash_struct(&self.primary_type, &data, &self.types, version)
    }

    pub fn hashes(&self, version: TypedDataVersion) -> Result<TypedDataHashes, Eip712Error> {
        let struct_hash = if self.primary_type == EIP712_DOMAIN {
            // compatibility with <https://github.com/MetaMask/eth-sig-util>
            None
        } else {
            Some(H256(self.struct_hash(version)?))
        };
        Ok(TypedDataHashes { domain_separator: H256(self.domain.separator()), struct_hash })
    }

    /// The digest that is actually signed
    pub fn encode_eip712(&self, version: TypedDataVersion) -> Result<[u8; 32], Eip712Error> {
        Ok(self.hashes(version)?.digest().0)
    }
}

/// Encodes an object by encoding and concatenating each of its members.
///
/// The encoding of a struct instance is `enc(value₁) ‖ enc(value₂) ‖ … ‖ enc(valueₙ)`, i.e. the
/// concatenation of the encoded member values in the order that they appear in the type. Each
/// encoded member value is exactly 32-byte long.
pub fn encode_data(
    primary_type: &str,
    data: &Value,
    types: &Types,
    version: TypedDataVersion,
) -> Result<Vec<Token>, Eip712Error> {
    let fields =
        types.get(primary_type).ok_or_else(|| Eip712Error::UndefinedType(primary_type.into()))?;
    let data = object(data).map_err(|source| Eip712Error::InvalidValue {
        field: primary_type.to_string(),
        source,
    })?;

    let mut tokens = vec![Token::Uint(U256::from(hash_type(primary_type, types)?))];
    for field in fields {
        match data.get(&field.name).filter(|value| !value.is_null()) {
            Some(value) => {
                tokens.push(encode_field(types, &field.name, &field.r#type, value, version)?)
            }
            None => match version {
                TypedDataVersion::V3 => {}
                TypedDataVersion::V4 if types.contains_key(&field.r#type) => {
                    tokens.push(Token::Uint(U256::zero()))
                }
                TypedDataVersion::V4 => return Err(Eip712Error::MissingValue(field.name.clone())),
            },
        }
    }

    Ok(tokens)
}

/// Hashes an object: `keccak256(encodeData(primary_type, data))`
pub fn hash_struct(
    primary_type: &str,
    data: &Value,
    types: &Types,
    version: TypedDataVersion,
) -> Result<[u8; 32], Eip712Error> {
    let tokens = encode_data(primary_type, data, types, version)?;
    Ok(keccak256(encode(&tokens)))
}

/// Returns the hashed encoded type of `primary_type`
pub fn hash_type(primary_type: &str, types: &Types) -> Result<[u8; 32], Eip712Error> {
    encode_type(primary_type, types).map(keccak256)
}

/// Encodes the type of an object: the primary type's signature followed by the signatures of
/// every referenced struct type in alphabetical order, e.g.
/// `Mail(Person from,Person to,string contents)Person(string name,address wallet)`.
pub fn encode_type(primary_type: &str, types: &Types) -> Result<String, Eip712Error> {
    if !types.contains_key(primary_type) {
        return Err(Eip712Error::UndefinedType(primary_type.to_string()))
    }
    let mut names = HashSet::new();
    find_type_dependencies(primary_type, types, &mut names);
    names.remove(primary_type);
    let mut deps: Vec<_> = names.into_iter().collect();
    deps.sort_unstable();
    deps.insert(0, primary_type);

    let mut res = String::new();
    for dep in deps {
        let fields = types.get(dep).ok_or_else(|| Eip712Error::UndefinedType(dep.to_string()))?;
        res += dep;
        res.push('(');
        res += &fields
            .iter()
            .map(|ty| format!("{} {}", ty.r#type, ty.name))
            .collect::<Vec<_>>()
            .join(",");
        res.push(')');
    }
    Ok(res)
}

/// Strips every array suffix: `Person[][2]` becomes `Person`
fn base_type(ty: &str) -> &str {
    ty.find('[').map_or(ty, |idx| &ty[..idx])
}

/// Collects every struct type reachable from `primary_type`, including itself
fn find_type_dependencies<'a>(
    primary_type: &'a str,
    types: &'a Types,
    found: &mut HashSet<&'a str>,
) {
    if found.contains(primary_type) {
        return
    }
    if let Some(fields) = types.get(primary_type) {
        found.insert(primary_type);
        for field in fields {
            find_type_dependencies(base_type(&field.r#type), types, found)
        }
    }
}

/// Encodes a single field value as one 32-byte word.
pub fn encode_field(
    types: &Types,
    field_name: &str,
    field_type: &str,
    value: &Value,
    version: TypedDataVersion,
) -> Result<Token, Eip712Error> {
    if types.contains_key(field_type) {
        let tokens = encode_data(field_type, value, types, version)?;
        return Ok(Token::Uint(U256::from(keccak256(encode(&tokens)))))
    }

    if let Some((element_type, _)) =
        field_type.strip_suffix(']').and_then(|ty| ty.rsplit_once('['))
    {
        if version == TypedDataVersion::V3 {
            return Err(Eip712Error::ArraysRequireV4)
        }
        let values = array(value)
            .map_err(|source| Eip712Error::InvalidValue { field: field_name.to_string(), source })?
            .iter()
            .map(|element| encode_field(types, field_name, element_type, element, version))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Token::Uint(U256::from(keccak256(encode(&values)))))
    }

    let primitive = Primitive::parse(field_type)
        .ok_or_else(|| Eip712Error::UnsupportedType(field_type.to_string()))?;
    primitive
        .encode_word(value)
        .map_err(|source| Eip712Error::InvalidValue { field: field_name.to_string(), source })
}

// Adapted tests from <https://github.com/MetaMask/eth-sig-util/blob/main/src/sign-typed-data.test.ts>
#[cfg(test)]
mod tests {
    use super::*;
    use super::TypedDataVersion::{V3, V4};

    fn typed_data(json: Value) -> TypedData {
        TypedData::parse(&json).unwrap()
    }

    fn digest(typed_data: &TypedData, version: TypedDataVersion) -> String {
        hex::encode(typed_data.encode_eip712(version).unwrap())
    }

    fn mail(reply_to: bool) -> Value {
        let mut mail = json!({
          "domain": {},
          "types": {
            "EIP712Domain": [],
            "Person": [
              { "name": "name", "type": "string" },
              { "name": "wallet", "type": "address" }
            ],
            "Mail": [
              { "name": "from", "type": "Person" },
              { "name": "to", "type": "Person" },
              { "name": "contents", "type": "string" }
            ]
          },
          "primaryType": "Mail",
          "message": {
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
          }
        });
        if reply_to {
            mail["types"]["Mail"]
                .as_array_mut()
                .unwrap()
                .push(json!({ "name": "replyTo", "type": "Mail" }));
            mail["message"]["replyTo"] = json!({
              "to": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
              "from": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
              "contents": "Hello!"
            });
        }
        mail
    }

    #[test]
    fn test_full_domain() {
        let typed_data = typed_data(json!({
          "types": {
            "EIP712Domain": [
              { "name": "name", "type": "string" },
              { "name": "version", "type": "string" },
              { "name": "chainId", "type": "uint256" },
              { "name": "verifyingContract", "type": "address" },
              { "name": "salt", "type": "bytes32" }
            ]
          },
          "primaryType": "EIP712Domain",
          "domain": {
            "name": "example.metamask.io",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0x0000000000000000000000000000000000000000"
          },
          "message": {}
        }));

        assert_eq!(
            digest(&typed_data, V4),
            "122d1c8ef94b76dad44dcb03fa772361e20855c63311a15d5afe02d1b38f6077"
        );
        assert_eq!(typed_data.hashes(V4).unwrap().struct_hash, None);
    }

    #[test]
    fn domain_separator_ignores_the_declared_domain_type() {
        let mut declared = mail(false);
        declared["domain"] = json!({ "name": "Ether Mail", "chainId": 1 });
        declared["types"]["EIP712Domain"] = json!([
            { "name": "chainId", "type": "uint256" },
            { "name": "name", "type": "string" }
        ]);
        let mut undeclared = declared.clone();
        undeclared["types"]["EIP712Domain"] = json!([]);

        let declared = typed_data(declared).hashes(V4).unwrap();
        let undeclared = typed_data(undeclared).hashes(V4).unwrap();
        assert_eq!(declared, undeclared);

        let expected = keccak256(encode(&[
            Token::Uint(U256::from(keccak256("EIP712Domain(string name,uint256 chainId)"))),
            Token::Uint(U256::from(keccak256("Ether Mail"))),
            Token::Uint(U256::one()),
        ]));
        assert_eq!(declared.domain_separator, H256(expected));
    }

    #[test]
    fn test_minimal_message() {
        let typed_data = typed_data(
            json!({"types":{"EIP712Domain":[]},"primaryType":"EIP712Domain","domain":{},"message":{}}),
        );
        assert_eq!(
            digest(&typed_data, V4),
            "8d4a3f4082945b7879e2b55f181c31a77c8c0a464b70669458abbaaf99de4c38"
        );
    }

    #[test]
    fn test_encode_custom_array_type() {
        let typed_data = typed_data(
            json!({"domain":{},"types":{"EIP712Domain":[],"Person":[{"name":"name","type":"string"},{"name":"wallet","type":"address[]"}],"Mail":[{"name":"from","type":"Person"},{"name":"to","type":"Person[]"},{"name":"contents","type":"string"}]},"primaryType":"Mail","message":{"from":{"name":"Cow","wallet":["0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826","0xDD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"]},"to":[{"name":"Bob","wallet":["0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"]}],"contents":"Hello, Bob!"}}),
        );
        assert_eq!(
            digest(&typed_data, V4),
            "80a3aeb51161cfc47884ddf8eac0d2343d6ae640efe78b6a69be65e3045c1321"
        );
        assert!(matches!(typed_data.encode_eip712(V3), Err(Eip712Error::ArraysRequireV4)));
    }

    #[test]
    fn test_hash_typed_message_with_data() {
        let typed_data = typed_data(json!({
          "types": {
            "EIP712Domain": [
              { "name": "name", "type": "string" },
              { "name": "version", "type": "string" },
              { "name": "chainId", "type": "uint256" },
              { "name": "verifyingContract", "type": "address" }
            ],
            "Message": [{ "name": "data", "type": "string" }]
          },
          "primaryType": "Message",
          "domain": {
            "name": "example.metamask.io",
            "version": "1",
            "chainId": "1",
            "verifyingContract": "0x0000000000000000000000000000000000000000"
          },
          "message": { "data": "Hello!" }
        }));

        assert_eq!(
            digest(&typed_data, V4),
            "232cd3ec058eb935a709f093e3536ce26cc9e8e193584b0881992525f6236eef"
        );
    }

    #[test]
    fn test_hash_custom_data_type() {
        let typed_data = typed_data(mail(false));
        let expected = "25c3d40a39e639a4d0b6e4d2ace5e1281e039c88494d97d8d08f99a6ea75d775";
        assert_eq!(digest(&typed_data, V4), expected);
        assert_eq!(digest(&typed_data, V3), expected);
    }

    #[test]
    fn test_hash_recursive_types() {
        let typed_data = typed_data(mail(true));
        assert_eq!(
            digest(&typed_data, V4),
            "0808c17abba0aef844b0470b77df9c994bc0fa3e244dc718afd66a3901c4bd7b"
        );
        // v3 skips the absent inner `replyTo` instead of hashing it as zero
        assert_ne!(digest(&typed_data, V3), digest(&typed_data, V4));
    }

    #[test]
    fn test_hash_nested_struct_array() {
        let typed_data = typed_data(json!({
          "types": {
            "EIP712Domain": [
              { "name": "name", "type": "string" },
              { "name": "version", "type": "string" },
              { "name": "chainId", "type": "uint256" },
              { "name": "verifyingContract", "type": "address" }
            ],
            "OrderComponents": [
              { "name": "offerer", "type": "address" },
              { "name": "zone", "type": "address" },
              { "name": "offer", "type": "OfferItem[]" },
              { "name": "startTime", "type": "uint256" },
              { "name": "endTime", "type": "uint256" },
              { "name": "zoneHash", "type": "bytes32" },
              { "name": "salt", "type": "uint256" },
              { "name": "conduitKey", "type": "bytes32" },
              { "name": "counter", "type": "uint256" }
            ],
            "OfferItem": [{ "name": "token", "type": "address" }],
            "ConsiderationItem": [
              { "name": "token", "type": "address" },
              { "name": "identifierOrCriteria", "type": "uint256" },
              { "name": "startAmount", "type": "uint256" },
              { "name": "endAmount", "type": "uint256" },
              { "name": "recipient", "type": "address" }
            ]
          },
          "primaryType": "OrderComponents",
          "domain": {
            "name": "Seaport",
            "version": "1.1",
            "chainId": "1",
            "verifyingContract": "0x00000000006c3852cbEf3e08E8dF289169EdE581"
          },
          "message": {
            "offerer": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "offer": [{ "token": "0xA604060890923Ff400e8c6f5290461A83AEDACec" }],
            "startTime": "1658645591",
            "endTime": "1659250386",
            "zone": "0x004C00500000aD104D7DBd00e3ae0A5C00560C00",
            "zoneHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "salt": "16178208897136618",
            "conduitKey": "0x0000007b02230091a7ed01230072f7006a004d60a8d4e71d599b8104250f0000",
            "totalOriginalConsiderationItems": "2",
            "counter": "0"
          }
        }));

        assert_eq!(
            digest(&typed_data, V4),
            "0b8aa9f3712df0034bc29fe5b24dd88cfdba02c7f499856ab24632e2969709a8"
        );
    }

    #[test]
    fn encodes_types_in_dependency_order() {
        let typed_data = typed_data(mail(true));
        assert_eq!(
            encode_type("Mail", &typed_data.types).unwrap(),
            "Mail(Person from,Person to,string contents,Mail replyTo)Person(string name,address wallet)"
        );
        assert!(matches!(
            encode_type("Missing", &typed_data.types),
            Err(Eip712Error::UndefinedType(_))
        ));
    }

    #[test]
    fn absent_primitives_fail_only_in_v4() {
        let mut doc = mail(false);
        doc["message"].as_object_mut().unwrap().remove("contents");
        let typed_data = typed_data(doc);
        assert!(matches!(typed_data.encode_eip712(V4), Err(Eip712Error::MissingValue(_))));
        assert!(typed_data.encode_eip712(V3).is_ok());
    }

    #[test]
    fn separates_syntax_and_structure_errors() {
        assert!(matches!(TypedData::from_json_str("{not json"), Err(Eip712Error::Json(_))));
        match TypedData::from_json_str(r#"{"types":{},"domain":[]}"#) {
            Err(Eip712Error::Invalid(err)) => {
                assert_eq!(err.shape_keys(), vec!["domain", "message", "primaryType"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unwraps_stringified_documents() {
        let doc = mail(false);
        let twice = serde_json::to_string(&doc.to_string()).unwrap();
        let parsed = TypedData::from_json_str(&twice).unwrap();
        assert_eq!(parsed, typed_data(doc));
    }

    #[test]
    fn reproduces_documents() {
        let doc = json!({
          "types": {
            "EIP712Domain": [{ "name": "chainId", "type": "uint256" }],
            "Message": [{ "name": "data", "type": "string" }]
          },
          "primaryType": "Message",
          "domain": { "chainId": "0x1" },
          "message": { "data": "Hello!" }
        });
        let typed_data = typed_data(doc);
        let value = typed_data.to_value();
        assert_eq!(value["domain"], json!({ "chainId": 1 }));
        assert_eq!(TypedData::parse(&value).unwrap(), typed_data);
    }
}
