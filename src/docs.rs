use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::memberships::list_membership_types,
        crate::api::memberships::create_membership_type,
        crate::api::memberships::get_membership_type,
        crate::api::memberships::replace_membership_type,
        crate::api::memberships::update_membership_type,
        crate::api::memberships::delete_membership_type,
        crate::api::user_memberships::list_user_memberships,
        crate::api::user_memberships::purchase_membership,
        crate::api::user_memberships::get_user_membership,
        crate::api::user_memberships::replace_user_membership,
        crate::api::user_memberships::update_user_membership,
        crate::api::user_memberships::delete_user_membership,
        crate::api::users::list_users,
        crate::api::users::create_user,
        crate::api::users::get_user,
        crate::api::users::replace_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::products::list_productos,
        crate::api::products::create_producto,
        crate::api::products::get_producto,
        crate::api::products::replace_producto,
        crate::api::products::update_producto,
        crate::api::products::delete_producto,
        crate::api::sales::list_ventas,
        crate::api::sales::get_venta,
        crate::api::sales::create_venta,
        crate::api::registration::register
    ),
    components(
        schemas(
            crate::models::MembershipType,
            crate::models::MembershipTypePayload,
            crate::models::MembershipTypePatch,
            crate::models::User,
            crate::models::UserPayload,
            crate::models::UserPatch,
            crate::models::UserMembership,
            crate::models::MembershipPurchase,
            crate::models::UserMembershipPayload,
            crate::models::UserMembershipPatch,
            crate::models::Producto,
            crate::models::ProductoPayload,
            crate::models::ProductoPatch,
            crate::models::Venta,
            crate::models::SaleItem,
            crate::models::CreateSaleRequest,
            crate::models::SaleCreated,
            crate::models::RegistrationRequest,
            crate::models::RegistrationCreated,
            crate::billing::RenewalOutcome,
            crate::billing::RenewalResult
        )
    ),
    tags(
        (name = "memberships", description = "Membership plan catalog"),
        (name = "user-memberships", description = "Member validity periods and renewals"),
        (name = "users", description = "Member accounts"),
        (name = "productos", description = "Shop inventory"),
        (name = "ventas", description = "Sales ledger and checkout"),
        (name = "registration", description = "Sign-up with first membership")
    )
)]
pub struct ApiDoc;
